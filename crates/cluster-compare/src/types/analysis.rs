//! Wire types for the per-feature analysis service
//!
//! `POST /api/feature-analysis` takes the original clusters, the matched
//! scenario clusters and the configured feature changes, and answers with
//! sensitivity, correlation and (optionally) impact breakdowns. The service is
//! loose about numeric types, so numeric fields here are read leniently.

use serde::{Deserialize, Serialize};

use super::cluster::{Cluster, ClusterSummary};
use super::feature::{FeatureChangeEntry, FeatureChanges, FeatureMap};
use super::lenient::{coerced_number, number_only, present_number};

/// Request body for the feature analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAnalysisRequest {
    #[serde(default)]
    pub original_clusters: Vec<ClusterSummary>,
    /// Scenario clusters after matching onto original identities
    #[serde(default)]
    pub scenario_clusters: Vec<ClusterSummary>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub feature_changes: Vec<FeatureChangeEntry>,
}

impl FeatureAnalysisRequest {
    /// Build a request from normalized clusters
    ///
    /// `features` falls back to the keys of `changes` when empty.
    pub fn new(
        original: &[Cluster],
        matched_scenario: &[Cluster],
        features: &[String],
        changes: &FeatureChanges,
    ) -> Self {
        Self {
            original_clusters: original.iter().map(wire_summary).collect(),
            scenario_clusters: matched_scenario.iter().map(wire_summary).collect(),
            features: changes.features_or(features),
            feature_changes: changes.to_entries(),
        }
    }

    /// Whether every part the service needs is present
    pub fn is_complete(&self) -> bool {
        !self.original_clusters.is_empty()
            && !self.scenario_clusters.is_empty()
            && !self.features.is_empty()
            && !self.feature_changes.is_empty()
    }
}

/// Summary as sent on the wire; positional identities become explicit
/// `cluster_number`s so both sides join the same way on the other end
fn wire_summary(cluster: &Cluster) -> ClusterSummary {
    let mut summary = cluster.summary.clone();
    if summary.declared_identity().is_none() {
        summary.cluster_number = Some(cluster.identity.clone());
    }
    summary
}

/// Per-feature sensitivity as reported by the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensitivityEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(default, deserialize_with = "coerced_number", skip_serializing_if = "Option::is_none")]
    pub percent_change: Option<f64>,
    #[serde(default, deserialize_with = "coerced_number", skip_serializing_if = "Option::is_none")]
    pub avg_score_change: Option<f64>,
    #[serde(default, deserialize_with = "coerced_number", skip_serializing_if = "Option::is_none")]
    pub max_score_change: Option<f64>,
    #[serde(default, deserialize_with = "coerced_number", skip_serializing_if = "Option::is_none")]
    pub min_score_change: Option<f64>,
    /// |avg score change / percent change|; shown as a percentage. Present
    /// but null reads as 0
    #[serde(default, deserialize_with = "present_number", skip_serializing_if = "Option::is_none")]
    pub sensitivity_ratio: Option<f64>,
    /// Older services send a ready-made percentage instead of a ratio
    #[serde(default, deserialize_with = "present_number", skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clusters_affected: Option<u64>,
}

/// Correlation between two features as reported by the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    /// Correlation percentage; anything but a JSON number reads as absent
    #[serde(default, deserialize_with = "number_only", skip_serializing_if = "Option::is_none")]
    pub correlation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
    #[serde(default, deserialize_with = "coerced_number", skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
}

/// Impact split for one feature as reported by the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(rename = "positiveImpact", default, deserialize_with = "coerced_number")]
    pub positive_impact: Option<f64>,
    #[serde(rename = "negativeImpact", default, deserialize_with = "coerced_number")]
    pub negative_impact: Option<f64>,
    #[serde(rename = "noChange", default, deserialize_with = "coerced_number")]
    pub no_change: Option<f64>,
    #[serde(rename = "totalImpact", default, deserialize_with = "coerced_number")]
    pub total_impact: Option<f64>,
}

/// Sensitivity entries in service order
pub type SensitivityMap = FeatureMap<SensitivityEntry>;

/// Correlation matrix: feature -> other feature -> entry, in service order
pub type CorrelationMatrix = FeatureMap<FeatureMap<CorrelationEntry>>;

/// Response of the feature analysis call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity_analysis: Option<SensitivityMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_analysis: Option<CorrelationMatrix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_breakdown: Option<FeatureMap<ImpactEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
