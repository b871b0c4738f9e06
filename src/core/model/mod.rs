/// One labelled test run: five ascending latency boundaries
/// (min, 25th percentile, median, 75th percentile, max).
#[derive(Clone, Debug, PartialEq)]
pub struct PercentileRecord {
    /// 1-based input line, 0 when the record was not read from a file.
    pub line: u64,
    pub label: String,
    pub q1_start: f64,
    pub q2_start: f64,
    pub q3_start: f64,
    pub q4_start: f64,
    pub q4_end: f64,
}

impl PercentileRecord {
    pub fn new(
        label: impl Into<String>,
        q1_start: f64,
        q2_start: f64,
        q3_start: f64,
        q4_start: f64,
        q4_end: f64,
    ) -> Self {
        Self {
            line: 0,
            label: label.into(),
            q1_start,
            q2_start,
            q3_start,
            q4_start,
            q4_end,
        }
    }

    pub fn at_line(mut self, line: u64) -> Self {
        self.line = line;
        self
    }

    pub fn bounds(&self) -> [f64; 5] {
        [
            self.q1_start,
            self.q2_start,
            self.q3_start,
            self.q4_start,
            self.q4_end,
        ]
    }

    /// Not enforced anywhere; callers only warn.
    pub fn is_monotonic(&self) -> bool {
        self.bounds().windows(2).all(|w| w[0] <= w[1])
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortOrder {
    Input,
    Label,
    Median,
}

pub fn sort_records(records: &mut [PercentileRecord], order: SortOrder) {
    match order {
        SortOrder::Input => {}
        SortOrder::Label => records.sort_by(|a, b| a.label.cmp(&b.label)),
        SortOrder::Median => records.sort_by(|a, b| a.q3_start.total_cmp(&b.q3_start)),
    }
}
