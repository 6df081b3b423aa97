//! Descriptive statistics over score arrays

use serde::{Deserialize, Serialize};

/// Mean, median and population standard deviation of a score array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl ScoreSummary {
    /// Summarize scores; `None` for an empty slice
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        Some(Self {
            count: scores.len(),
            mean: mean(scores)?,
            median: median(scores)?,
            std_dev: std_dev(scores)?,
        })
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sorted midpoint; the average of the two middle values for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[middle - 1] + sorted[middle]) / 2.0)
    } else {
        Some(sorted[middle])
    }
}

/// Population standard deviation (divides by N)
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Percent change from `original` to `scenario`
///
/// Defined as 0 when `original <= 0` (or NaN) so callers never see an
/// infinite or negative-base percentage.
pub fn improvement_percent(original: f64, scenario: f64) -> f64 {
    if original > 0.0 && !scenario.is_nan() {
        (scenario - original) / original * 100.0
    } else {
        0.0
    }
}

/// Round to a fixed number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
