//! Derived comparison records
//!
//! Every record here is a view computed from immutable cluster snapshots; none
//! of them feeds back into matching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown wherever a statistic cannot be computed
pub const NOT_AVAILABLE: &str = "N/A";

/// Aggregate score statistics for original vs scenario runs
///
/// Aggregates are `None` when either run is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonStats {
    pub original_avg: Option<f64>,
    pub scenario_avg: Option<f64>,
    /// Percent change of the scenario mean over the original mean
    pub improvement: Option<f64>,
    pub original_median: Option<f64>,
    pub scenario_median: Option<f64>,
    pub original_std_dev: Option<f64>,
    pub scenario_std_dev: Option<f64>,
    /// Number of clusters in the original run
    pub total_clusters: usize,
    pub improved_clusters: usize,
    pub declined_clusters: usize,
    pub unchanged_clusters: usize,
}

impl ComparisonStats {
    /// Format a statistic with fixed decimals, or "N/A"
    pub fn display(value: Option<f64>, decimals: usize) -> String {
        match value {
            Some(v) => format!("{:.*}", decimals, v),
            None => NOT_AVAILABLE.to_string(),
        }
    }

    pub fn original_avg_display(&self) -> String {
        Self::display(self.original_avg, 2)
    }

    pub fn scenario_avg_display(&self) -> String {
        Self::display(self.scenario_avg, 2)
    }

    pub fn improvement_display(&self) -> String {
        Self::display(self.improvement, 1)
    }
}

/// Outcome of one matched cluster pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStatus {
    Improved,
    Declined,
    Unchanged,
}

impl ClusterStatus {
    /// Sign-only status, used for per-row labels
    pub fn from_improvement(improvement: f64) -> Self {
        if improvement > 0.0 {
            Self::Improved
        } else if improvement < 0.0 {
            Self::Declined
        } else {
            Self::Unchanged
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Improved => "Improved",
            Self::Declined => "Declined",
            Self::Unchanged => "Unchanged",
        }
    }
}

/// Counts of matched pairs per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCounts {
    pub improved: usize,
    pub declined: usize,
    pub unchanged: usize,
}

impl ClassificationCounts {
    pub fn record(&mut self, status: ClusterStatus) {
        match status {
            ClusterStatus::Improved => self.improved += 1,
            ClusterStatus::Declined => self.declined += 1,
            ClusterStatus::Unchanged => self.unchanged += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.improved + self.declined + self.unchanged
    }
}

/// One joined original/scenario cluster pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterComparisonRow {
    /// Cluster identity, rendered for display
    pub cluster: String,
    pub original: f64,
    pub scenario: f64,
    /// Percent change of the scenario score over the original score
    pub improvement: f64,
    pub status: ClusterStatus,
}

/// One slice of the improvement distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBucket {
    pub name: String,
    pub value: usize,
}

/// Direction of a feature's effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeDirection {
    Positive,
    Negative,
    #[serde(rename = "No Change")]
    NoChange,
}

impl ChangeDirection {
    pub fn from_sign(value: f64) -> Self {
        if value > 0.0 {
            Self::Positive
        } else if value < 0.0 {
            Self::Negative
        } else {
            Self::NoChange
        }
    }
}

impl fmt::Display for ChangeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::NoChange => "No Change",
        })
    }
}

/// Ranked sensitivity of one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub feature: String,
    /// Sensitivity percentage
    pub sensitivity: f64,
    pub direction: ChangeDirection,
    /// "High", "Medium", "Low" or "No Change"
    pub magnitude: String,
    /// Absolute configured change, as a percentage
    pub feature_change: f64,
}

/// Positive/negative split of a feature's impact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRow {
    pub feature: String,
    pub positive_impact: f64,
    pub negative_impact: f64,
    pub no_change: f64,
    pub total_impact: f64,
}

/// One cell of the feature correlation heatmap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub x: String,
    pub y: String,
    pub value: f64,
    pub correlation: f64,
    pub direction: String,
    pub strength: String,
}

/// Correlation of one other feature against a chosen feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCorrelationRow {
    pub feature: String,
    pub correlation: f64,
    pub direction: String,
    pub strength: String,
    pub change: f64,
}

/// How a configured feature change reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureChangeSummaryRow {
    pub feature: String,
    /// Signed change as a percentage
    pub change: f64,
    /// "Increased", "Decreased" or "No Change"
    pub change_type: String,
    pub magnitude: f64,
}

/// Where the sensitivity and correlation views came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    /// Feature analysis result was available
    Service,
    /// Local estimate from the configured changes only
    Fallback,
}

/// Everything the comparison view displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub stats: ComparisonStats,
    pub classification: ClassificationCounts,
    pub cluster_rows: Vec<ClusterComparisonRow>,
    pub improvement_distribution: Vec<DistributionBucket>,
    pub sensitivity: Vec<SensitivityRow>,
    pub impact_breakdown: Vec<ImpactRow>,
    pub correlation_heatmap: Vec<HeatmapCell>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_correlations: Vec<FeatureCorrelationRow>,
    pub feature_changes: Vec<FeatureChangeSummaryRow>,
    pub analysis_source: AnalysisSource,
    pub generated_at: DateTime<Utc>,
}
