//! Comparison statistics over matched cluster runs

pub mod comparison;
pub mod correlation;
pub mod sensitivity;
pub mod summary;
pub mod validate;

pub use comparison::{
    classify, classify_pairs, cluster_comparison_rows, comparison_stats,
    improvement_distribution, joined_pairs, UNCHANGED_EPSILON,
};
pub use correlation::{correlation_heatmap, feature_correlations, CorrelationShade};
pub use sensitivity::{feature_change_summary, impact_breakdown, sensitivity_ranking};
pub use summary::{improvement_percent, mean, median, std_dev, ScoreSummary};
pub use validate::{validate_chart_data, ChartRecord, NO_DATA};
