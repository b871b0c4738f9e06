use crate::core::model::PercentileRecord;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use thiserror::Error;

pub const FIELD_NAMES: [&str; 6] = [
    "label", "q1_start", "q2_start", "q3_start", "q4_start", "q4_end",
];

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: expected 6 fields (label and 5 percentiles), found {found}")]
    TooFewFields { line: u64, found: usize },
    #[error("line {line}: field {name} is not a finite number: {value:?}")]
    InvalidNumber {
        line: u64,
        name: &'static str,
        value: String,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ParseOptions {
    /// Skip the first data row.
    pub header: bool,
}

/// Reads `label, min, p25, median, p75, max` rows in input order.
///
/// Fields are comma separated and may be quoted with `'`. Rows printed as
/// tuples (`('label', 1.0, 2.0, 3.0, 4.0, 5.0),`) are accepted as well, so
/// benchmark output can be pasted in unchanged. Blank lines are skipped, as
/// are lines starting with `#` unless they hold a complete record (a label
/// such as `#1 cold`). Columns after the sixth are ignored.
pub fn parse_records<R: Read>(
    mut input: R,
    opts: ParseOptions,
) -> Result<Vec<PercentileRecord>, ParseError> {
    let mut raw = String::new();
    input.read_to_string(&mut raw)?;

    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .quote(b'\'')
        .trim(Trim::All);

    let mut records = Vec::new();
    let mut skip_header = opts.header;
    for (idx, raw_line) in raw.lines().enumerate() {
        let line = idx as u64 + 1;
        let text = strip_tuple(raw_line);
        if text.is_empty() {
            continue;
        }
        let parsed = split_line(&builder, text).and_then(|row| parse_row(&row, line));
        if text.starts_with('#') && parsed.is_err() {
            continue;
        }
        if skip_header {
            skip_header = false;
            continue;
        }
        records.push(parsed?);
    }
    Ok(records)
}

fn split_line(builder: &ReaderBuilder, text: &str) -> Result<StringRecord, ParseError> {
    let mut reader = builder.from_reader(text.as_bytes());
    let mut row = StringRecord::new();
    reader.read_record(&mut row)?;
    Ok(row)
}

fn parse_row(row: &StringRecord, line: u64) -> Result<PercentileRecord, ParseError> {
    if row.len() < FIELD_NAMES.len() {
        return Err(ParseError::TooFewFields {
            line,
            found: row.len(),
        });
    }

    let mut values = [0.0f64; 5];
    for (i, slot) in values.iter_mut().enumerate() {
        let column = i + 1;
        let text = unquote(&row[column]);
        *slot = match text.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                return Err(ParseError::InvalidNumber {
                    line,
                    name: FIELD_NAMES[column],
                    value: text.to_string(),
                });
            }
        };
    }

    let [q1_start, q2_start, q3_start, q4_start, q4_end] = values;
    Ok(PercentileRecord::new(
        unquote(&row[0]),
        q1_start,
        q2_start,
        q3_start,
        q4_start,
        q4_end,
    )
    .at_line(line))
}

fn strip_tuple(line: &str) -> &str {
    let t = line.trim();
    let body = t.strip_suffix(',').unwrap_or(t).trim_end();
    match body.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        Some(inner) => inner,
        None => t,
    }
}

// The csv reader only honours a quote at the very start of a field, so a
// quoted value after `, ` arrives with its quotes intact.
fn unquote(field: &str) -> &str {
    let t = field.trim();
    for q in ['\'', '"'] {
        if t.len() >= 2 && t.starts_with(q) && t.ends_with(q) {
            return &t[1..t.len() - 1];
        }
    }
    t
}
