//! Comparison engine: everything the comparison view shows, in one report

use chrono::Utc;

use crate::config::ComparisonConfig;
use crate::matching::match_clusters;
use crate::providers::FeatureAnalysisProvider;
use crate::session::{AnalysisSession, RefreshOutcome};
use crate::stats::{
    classify_pairs, cluster_comparison_rows, comparison_stats, correlation_heatmap,
    feature_change_summary, feature_correlations, impact_breakdown, improvement_distribution,
    sensitivity_ranking, validate_chart_data,
};
use crate::types::{
    AnalysisSource, Cluster, ClusterSummary, ComparisonReport, FeatureAnalysis,
    FeatureAnalysisRequest, FeatureChanges,
};

/// One original run, one scenario run, and the changes that produced it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonInput {
    pub original: Vec<Cluster>,
    pub scenario: Vec<Cluster>,
    pub feature_changes: FeatureChanges,
    /// Features to report on; empty means every configured change
    pub selected_features: Vec<String>,
    /// Feature whose correlations are listed individually
    pub correlations_for: Option<String>,
}

impl ComparisonInput {
    /// Build from raw producer summaries, resolving identities
    pub fn from_summaries(
        original: Vec<ClusterSummary>,
        scenario: Vec<ClusterSummary>,
        feature_changes: FeatureChanges,
    ) -> Self {
        Self {
            original: Cluster::normalize_all(original),
            scenario: Cluster::normalize_all(scenario),
            feature_changes,
            selected_features: Vec::new(),
            correlations_for: None,
        }
    }

    pub fn with_selected_features(mut self, features: Vec<String>) -> Self {
        self.selected_features = features;
        self
    }

    pub fn with_correlations_for(mut self, feature: impl Into<String>) -> Self {
        self.correlations_for = Some(feature.into());
        self
    }

    /// Both runs and at least one feature change are present
    pub fn is_analyzable(&self) -> bool {
        !self.original.is_empty() && !self.scenario.is_empty() && !self.feature_changes.is_empty()
    }

    /// Analysis request over the matched scenario
    pub fn analysis_request(&self) -> FeatureAnalysisRequest {
        let matched = match_clusters(&self.original, &self.scenario);
        FeatureAnalysisRequest::new(
            &self.original,
            &matched,
            &self.selected_features,
            &self.feature_changes,
        )
    }
}

/// Builds comparison reports
///
/// `compare` is pure; `run` refreshes the session's analysis first.
#[derive(Debug, Clone, Default)]
pub struct ComparisonEngine {
    config: ComparisonConfig,
}

impl ComparisonEngine {
    pub fn new(config: ComparisonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Assemble a report; without an analysis result the sensitivity and
    /// impact views are estimated from the configured changes
    pub fn compare(
        &self,
        input: &ComparisonInput,
        analysis: Option<&FeatureAnalysis>,
    ) -> ComparisonReport {
        let matched = match_clusters(&input.original, &input.scenario);
        let changes = &input.feature_changes;
        let selected = &input.selected_features;

        let stats = comparison_stats(&input.original, &input.scenario);
        let classification = classify_pairs(&input.original, &matched);
        let rows = cluster_comparison_rows(&input.original, &matched);
        let distribution = improvement_distribution(&rows, self.config.stable_threshold_percent);

        let selected_correlations = input
            .correlations_for
            .as_deref()
            .map(|feature| feature_correlations(analysis, feature))
            .unwrap_or_default();

        let analysis_source = if analysis.is_some() {
            AnalysisSource::Service
        } else {
            AnalysisSource::Fallback
        };

        tracing::info!(
            "Comparison report: {} original, {} scenario clusters, {} rows, analysis: {:?}",
            input.original.len(),
            input.scenario.len(),
            rows.len(),
            analysis_source
        );

        ComparisonReport {
            stats,
            classification,
            cluster_rows: validate_chart_data(rows),
            improvement_distribution: distribution,
            sensitivity: validate_chart_data(sensitivity_ranking(analysis, changes, selected)),
            impact_breakdown: impact_breakdown(analysis, changes, selected),
            correlation_heatmap: correlation_heatmap(analysis),
            selected_correlations,
            feature_changes: feature_change_summary(changes, selected),
            analysis_source,
            generated_at: Utc::now(),
        }
    }

    /// Refresh the session's analysis, then report with whatever it holds
    pub async fn run(
        &self,
        session: &AnalysisSession,
        provider: &dyn FeatureAnalysisProvider,
        input: &ComparisonInput,
    ) -> ComparisonReport {
        let outcome = session.refresh(provider, input).await;
        if outcome != RefreshOutcome::Applied {
            tracing::debug!("Analysis refresh outcome: {:?}", outcome);
        }
        let analysis = session.latest();
        self.compare(input, analysis.as_ref())
    }
}
