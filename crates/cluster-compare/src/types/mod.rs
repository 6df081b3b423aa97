//! Core types for cluster comparison

pub mod analysis;
pub mod cluster;
pub mod feature;
mod lenient;
pub mod report;

pub use analysis::{
    CorrelationEntry, CorrelationMatrix, FeatureAnalysis, FeatureAnalysisRequest, ImpactEntry,
    SensitivityEntry, SensitivityMap,
};
pub use cluster::{Centroid, Cluster, ClusterId, ClusterSummary};
pub use feature::{FeatureChangeEntry, FeatureChanges, FeatureMap};
pub use report::{
    AnalysisSource, ChangeDirection, ClassificationCounts, ClusterComparisonRow, ClusterStatus,
    ComparisonReport, ComparisonStats, DistributionBucket, FeatureChangeSummaryRow,
    FeatureCorrelationRow, HeatmapCell, ImpactRow, SensitivityRow,
};
