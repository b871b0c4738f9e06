use crate::core::model::{AxisRange, PercentileRecord};
use crate::report::svg::{fmt_tick, xml_escape};
use anyhow::{Context, Result};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct Page<'a> {
    pub title: &'a str,
    pub source: &'a str,
    pub svg: &'a str,
    pub records: &'a [PercentileRecord],
    pub range: AxisRange,
}

pub fn write(path: &Path, page: &Page<'_>) -> Result<()> {
    let html = render(page)?;
    let mut w = BufWriter::new(
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
    );
    w.write_all(html.as_bytes())?;
    w.flush()?;
    Ok(())
}

pub fn render(page: &Page<'_>) -> Result<String> {
    let mut html = String::with_capacity(page.svg.len() + 4096);

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        html,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>"
    )?;
    writeln!(html, "<title>{}</title>", xml_escape(page.title))?;
    writeln!(html, "<style>")?;
    writeln!(
        html,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;background:#fff;}}"
    )?;
    writeln!(html, "h1{{margin:0 0 8px 0;font-size:22px;}}")?;
    writeln!(
        html,
        ".meta{{color:#555;font-size:13px;margin-bottom:16px;}}"
    )?;
    writeln!(html, ".plot{{margin:8px 0 16px 0;}}")?;
    writeln!(html, "svg{{border:1px solid #e5e5e5;}}")?;
    writeln!(
        html,
        ".table{{border-collapse:collapse;max-width:1000px;font-size:12px;}}"
    )?;
    writeln!(
        html,
        ".table th,.table td{{border:1px solid #ddd;padding:4px 8px;text-align:right;}}"
    )?;
    writeln!(
        html,
        ".table th:first-child,.table td:first-child{{text-align:left;}}"
    )?;
    writeln!(html, ".odd{{color:#c00000;}}")?;
    writeln!(html, "</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;

    writeln!(html, "<h1>{}</h1>", xml_escape(page.title))?;
    writeln!(
        html,
        "<div class=\"meta\">Source: {} &middot; {} runs &middot; y-axis {} to {}</div>",
        xml_escape(page.source),
        page.records.len(),
        fmt_tick(page.range.min),
        fmt_tick(page.range.max)
    )?;

    writeln!(html, "<div class=\"plot\">")?;
    html.push_str(page.svg);
    writeln!(html, "</div>")?;

    table_records(&mut html, page.records)?;

    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;
    Ok(html)
}

fn table_records(out: &mut String, records: &[PercentileRecord]) -> Result<()> {
    writeln!(out, "<table class=\"table\">")?;
    writeln!(
        out,
        "<tr><th>Run</th><th>Min</th><th>25%</th><th>Median</th><th>75%</th><th>Max</th></tr>"
    )?;
    for r in records {
        // Out-of-order boundaries are drawn anyway; flag the row.
        let class = if r.is_monotonic() { "" } else { " class=\"odd\"" };
        write!(out, "<tr{}><td>{}</td>", class, xml_escape(&r.label))?;
        for v in r.bounds() {
            write!(out, "<td>{:.4}</td>", v)?;
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</table>")?;
    Ok(())
}
