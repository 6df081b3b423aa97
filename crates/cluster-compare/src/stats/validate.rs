//! Chart input validation
//!
//! Chart consumers may assume a non-empty dataset with finite numbers: records
//! with a non-finite charted field are dropped, and an emptied dataset is
//! replaced by a single "No Data" placeholder.

use crate::types::{ChangeDirection, ClusterComparisonRow, ClusterStatus, SensitivityRow};

/// Label used by placeholder records
pub const NO_DATA: &str = "No Data";

/// A record bound to a chart
pub trait ChartRecord: Sized {
    /// Numeric fields the chart plots
    fn charted_values(&self) -> Vec<f64>;

    /// Zeroed record labelled "No Data"
    fn placeholder() -> Self;

    fn is_chartable(&self) -> bool {
        self.charted_values().iter().all(|v| v.is_finite())
    }
}

impl ChartRecord for ClusterComparisonRow {
    fn charted_values(&self) -> Vec<f64> {
        vec![self.original, self.scenario, self.improvement]
    }

    fn placeholder() -> Self {
        Self {
            cluster: NO_DATA.to_string(),
            original: 0.0,
            scenario: 0.0,
            improvement: 0.0,
            status: ClusterStatus::Unchanged,
        }
    }
}

impl ChartRecord for SensitivityRow {
    fn charted_values(&self) -> Vec<f64> {
        vec![self.sensitivity, self.feature_change]
    }

    fn placeholder() -> Self {
        Self {
            feature: NO_DATA.to_string(),
            sensitivity: 0.0,
            direction: ChangeDirection::NoChange,
            magnitude: "No Change".to_string(),
            feature_change: 0.0,
        }
    }
}

/// Drop unchartable records; never returns an empty vector
pub fn validate_chart_data<T: ChartRecord>(records: Vec<T>) -> Vec<T> {
    let before = records.len();
    let mut valid: Vec<T> = records.into_iter().filter(|r| r.is_chartable()).collect();

    if valid.len() < before {
        tracing::warn!(
            "Dropped {} chart records with non-finite values",
            before - valid.len()
        );
    }
    if valid.is_empty() {
        valid.push(T::placeholder());
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(original: f64, improvement: f64) -> ClusterComparisonRow {
        ClusterComparisonRow {
            cluster: "1".to_string(),
            original,
            scenario: 10.0,
            improvement,
            status: ClusterStatus::from_improvement(improvement),
        }
    }

    #[test]
    fn test_filters_non_finite() {
        let rows = validate_chart_data(vec![
            row(5.0, 1.0),
            row(f64::INFINITY, 0.0),
            row(5.0, f64::NAN),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].original, 5.0);
    }

    #[test]
    fn test_placeholder_when_emptied() {
        let rows = validate_chart_data(vec![row(f64::NAN, 0.0)]);
        assert_eq!(rows, vec![ClusterComparisonRow::placeholder()]);

        let rows: Vec<SensitivityRow> = validate_chart_data(Vec::new());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].feature, NO_DATA);
        assert_eq!(rows[0].sensitivity, 0.0);
    }
}
