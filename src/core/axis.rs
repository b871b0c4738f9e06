use crate::core::model::{AxisRange, PercentileRecord};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AxisError {
    #[error("no records to plot; cannot derive a y-axis range")]
    NoRecords,
}

/// y-axis bounds: floor of the lowest 25th percentile and ceil of the highest
/// 75th percentile plus one. Whisker ends outside this window get clipped.
pub fn y_axis_range(records: &[PercentileRecord]) -> Result<AxisRange, AxisError> {
    if records.is_empty() {
        return Err(AxisError::NoRecords);
    }
    let mut low = f64::INFINITY;
    let mut high = f64::NEG_INFINITY;
    for r in records {
        low = low.min(r.q2_start);
        high = high.max(r.q4_start + 1.0);
    }
    Ok(AxisRange {
        min: low.floor(),
        max: high.ceil(),
    })
}

/// Tick layout on 1/2/5 x 10^k steps: `(first tick, step, tick count)`.
pub fn nice_ticks(min: f64, max: f64, ticks: usize) -> (f64, f64, usize) {
    let range = (max - min).abs().max(1e-9);
    let rough = range / (ticks.max(2) as f64 - 1.0);
    let mag = 10f64.powf(rough.abs().log10().floor());
    let norm = rough / mag;
    let step = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    } * mag;
    let start = (min / step).ceil() * step;
    let end = (max / step).floor() * step;
    let count = ((end - start) / step).round().max(0.0) as usize + 1;
    (start, step, count)
}
