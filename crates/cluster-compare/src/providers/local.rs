//! In-process feature analysis
//!
//! Computes the same response the analysis service returns, from the request
//! alone. Clusters are joined on resolved identity; the scenario side of a
//! request has already been matched onto original identities.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::stats::comparison::joined_pairs;
use crate::stats::summary::{mean, round_to, std_dev};
use crate::types::{
    Cluster, CorrelationEntry, CorrelationMatrix, FeatureAnalysis, FeatureAnalysisRequest,
    FeatureChanges, FeatureMap, SensitivityEntry, SensitivityMap,
};

use super::FeatureAnalysisProvider;

const MISSING_DATA: &str = "Missing required data for feature analysis";
const COMPLETE_MESSAGE: &str = "Analysis complete using direct statistical methods.";

/// Correlation used when the impact vectors carry no variance
const SAME_SIGN_CORRELATION: f64 = 0.3;
const OPPOSITE_SIGN_CORRELATION: f64 = -0.2;

/// Feature analysis without a network round trip
#[derive(Debug, Clone, Default)]
pub struct LocalAnalysisProvider;

impl LocalAnalysisProvider {
    pub fn new() -> Self {
        Self
    }

    /// Run the analysis synchronously
    pub fn analyze_now(&self, request: &FeatureAnalysisRequest) -> Result<FeatureAnalysis> {
        if !request.is_complete() {
            tracing::warn!(
                "Rejecting feature analysis: original={}, scenario={}, features={}, changes={}",
                request.original_clusters.len(),
                request.scenario_clusters.len(),
                request.features.len(),
                request.feature_changes.len()
            );
            return Err(Error::analysis(MISSING_DATA));
        }

        let original = Cluster::normalize_all(request.original_clusters.clone());
        let scenario = Cluster::normalize_all(request.scenario_clusters.clone());
        let score_changes: Vec<f64> = joined_pairs(&original, &scenario)
            .into_iter()
            .map(|(oc, sc)| sc.avg_score() - oc.avg_score())
            .collect();

        let sensitivity = feature_sensitivity(request, &score_changes);
        let changes: FeatureChanges = request
            .feature_changes
            .iter()
            .map(|entry| (entry.feature.clone(), entry.percent_change))
            .collect();
        let correlation = feature_correlations(&request.features, &changes, score_changes.len());

        tracing::info!(
            "Local feature analysis: {} joined clusters, {} sensitivity entries, {} correlated features",
            score_changes.len(),
            sensitivity.len(),
            correlation.len()
        );

        Ok(FeatureAnalysis {
            sensitivity_analysis: Some(sensitivity),
            correlation_analysis: Some(correlation),
            impact_breakdown: None,
            message: Some(COMPLETE_MESSAGE.to_string()),
        })
    }
}

#[async_trait]
impl FeatureAnalysisProvider for LocalAnalysisProvider {
    async fn analyze(&self, request: &FeatureAnalysisRequest) -> Result<FeatureAnalysis> {
        self.analyze_now(request)
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// High >= 0.5, Medium >= 0.2, else Low
pub fn sensitivity_level(ratio: f64) -> &'static str {
    if ratio >= 0.5 {
        "High"
    } else if ratio >= 0.2 {
        "Medium"
    } else {
        "Low"
    }
}

fn feature_sensitivity(request: &FeatureAnalysisRequest, score_changes: &[f64]) -> SensitivityMap {
    let mut sensitivity = SensitivityMap::new();
    let Some(avg_change) = mean(score_changes) else {
        tracing::warn!("No clusters join between original and scenario runs");
        return sensitivity;
    };
    let max_change = score_changes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_change = score_changes.iter().copied().fold(f64::INFINITY, f64::min);

    for entry in &request.feature_changes {
        let ratio = if entry.percent_change != 0.0 {
            (avg_change / entry.percent_change).abs()
        } else {
            0.0
        };
        let level = sensitivity_level(ratio);
        tracing::debug!(
            "Feature {}: avg change {:.3}, ratio {:.3}, level {}",
            entry.feature,
            avg_change,
            ratio,
            level
        );

        sensitivity.insert(
            entry.feature.clone(),
            SensitivityEntry {
                feature: Some(entry.feature.clone()),
                percent_change: Some(entry.percent_change),
                avg_score_change: Some(round_to(avg_change, 3)),
                max_score_change: Some(round_to(max_change, 3)),
                min_score_change: Some(round_to(min_change, 3)),
                sensitivity_ratio: Some(round_to(ratio, 3)),
                sensitivity: None,
                sensitivity_level: Some(level.to_string()),
                clusters_affected: Some(score_changes.len() as u64),
            },
        );
    }
    sensitivity
}

/// Relative spread below which a series counts as constant
const VARIANCE_TOLERANCE: f64 = 1e-12;

/// Pearson correlation; `None` when either side has no variance
///
/// A constant series still shows a rounding-level spread (about 1e-17 for
/// `[0.1; 3]`), so spread is compared against the series' magnitude.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() {
        return None;
    }
    let (mx, my) = (mean(xs)?, mean(ys)?);
    let (sx, sy) = (std_dev(xs)?, std_dev(ys)?);
    if is_constant(sx, mx) || is_constant(sy, my) {
        return None;
    }
    let covariance = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mx) * (y - my))
        .sum::<f64>()
        / xs.len() as f64;
    let r = covariance / (sx * sy);
    r.is_finite().then_some(r)
}

fn is_constant(spread: f64, mean: f64) -> bool {
    spread <= VARIANCE_TOLERANCE * mean.abs().max(1.0)
}

fn strength_label(percent: f64) -> &'static str {
    if percent >= 70.0 {
        "Strong"
    } else if percent >= 40.0 {
        "Moderate"
    } else {
        "Weak"
    }
}

fn no_correlation() -> CorrelationEntry {
    CorrelationEntry {
        correlation: Some(0.0),
        direction: Some("No Correlation".to_string()),
        strength: Some("None".to_string()),
        change: None,
    }
}

fn feature_correlations(
    features: &[String],
    changes: &FeatureChanges,
    joined_clusters: usize,
) -> CorrelationMatrix {
    let mut matrix = CorrelationMatrix::new();

    for first in features {
        let mut row = FeatureMap::new();
        for second in features {
            if first == second {
                row.insert(
                    second.clone(),
                    CorrelationEntry {
                        correlation: Some(1.0),
                        direction: Some("Positive".to_string()),
                        strength: Some("Strong".to_string()),
                        change: None,
                    },
                );
                continue;
            }

            if joined_clusters <= 1 {
                row.insert(second.clone(), no_correlation());
                continue;
            }

            let (first_change, second_change) = (changes.get(first), changes.get(second));
            // Each joined cluster sees the same configured change
            let first_impacts = vec![first_change; joined_clusters];
            let second_impacts = vec![second_change; joined_clusters];

            let r = pearson(&first_impacts, &second_impacts).unwrap_or(
                if first_change * second_change > 0.0 {
                    SAME_SIGN_CORRELATION
                } else {
                    OPPOSITE_SIGN_CORRELATION
                },
            );
            let percent = r.abs() * 100.0;

            row.insert(
                second.clone(),
                CorrelationEntry {
                    correlation: Some(percent),
                    direction: Some(if r >= 0.0 { "Positive" } else { "Negative" }.to_string()),
                    strength: Some(strength_label(percent).to_string()),
                    change: Some(second_change),
                },
            );
        }
        matrix.insert(first.clone(), row);
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClusterSummary;

    fn request() -> FeatureAnalysisRequest {
        let original = Cluster::normalize_all(vec![
            ClusterSummary::numbered(1).with_score(40.0),
            ClusterSummary::numbered(2).with_score(60.0),
        ]);
        let scenario = Cluster::normalize_all(vec![
            ClusterSummary::numbered(1).with_score(50.0),
            ClusterSummary::numbered(2).with_score(58.0),
        ]);
        let changes = FeatureChanges::new()
            .with("water_access", 0.2)
            .with("road_density", -0.1)
            .with("literacy", 0.0);
        FeatureAnalysisRequest::new(&original, &scenario, &[], &changes)
    }

    #[test]
    fn test_sensitivity() {
        let analysis = LocalAnalysisProvider::new().analyze_now(&request()).unwrap();
        let sensitivity = analysis.sensitivity_analysis.unwrap();

        // score changes: +10, -2 -> avg 4
        let water = &sensitivity["water_access"];
        assert_eq!(water.avg_score_change, Some(4.0));
        assert_eq!(water.max_score_change, Some(10.0));
        assert_eq!(water.min_score_change, Some(-2.0));
        assert_eq!(water.sensitivity_ratio, Some(20.0));
        assert_eq!(water.sensitivity_level.as_deref(), Some("High"));
        assert_eq!(water.clusters_affected, Some(2));

        let literacy = &sensitivity["literacy"];
        assert_eq!(literacy.sensitivity_ratio, Some(0.0));
        assert_eq!(literacy.sensitivity_level.as_deref(), Some("Low"));
        assert_eq!(analysis.message.as_deref(), Some(COMPLETE_MESSAGE));
    }

    #[test]
    fn test_correlations_without_variance() {
        let analysis = LocalAnalysisProvider::new().analyze_now(&request()).unwrap();
        let matrix = analysis.correlation_analysis.unwrap();
        assert_eq!(matrix.len(), 3);

        let water = &matrix["water_access"];
        assert_eq!(water["water_access"].correlation, Some(1.0));

        // opposite signs -> -0.2
        let road = &water["road_density"];
        assert!((road.correlation.unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(road.direction.as_deref(), Some("Negative"));
        assert_eq!(road.strength.as_deref(), Some("Weak"));

        let same_sign = feature_correlations(
            &["a".to_string(), "b".to_string()],
            &FeatureChanges::new().with("a", 0.1).with("b", 0.4),
            3,
        );
        let ab = &same_sign["a"]["b"];
        assert!((ab.correlation.unwrap() - 30.0).abs() < 1e-9);
        assert_eq!(ab.direction.as_deref(), Some("Positive"));
        assert_eq!(ab.strength.as_deref(), Some("Weak"));
    }

    #[test]
    fn test_sign_rule_regardless_of_cluster_count() {
        let features = ["a".to_string(), "b".to_string(), "c".to_string()];
        let changes = FeatureChanges::new().with("a", 0.1).with("b", 0.4).with("c", -0.3);
        for joined in 2..=12 {
            let matrix = feature_correlations(&features, &changes, joined);
            assert_eq!(matrix["a"]["b"].correlation, Some(30.0), "{joined} clusters");
            assert_eq!(matrix["a"]["c"].correlation, Some(20.0), "{joined} clusters");
            assert_eq!(matrix["c"]["a"].direction.as_deref(), Some("Negative"));
        }
        // matrix rows keep feature order
        let matrix = feature_correlations(&features, &changes, 3);
        assert_eq!(matrix.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_single_joined_cluster_has_no_correlation() {
        let matrix = feature_correlations(
            &["a".to_string(), "b".to_string()],
            &FeatureChanges::new().with("a", 0.1).with("b", 0.4),
            1,
        );
        assert_eq!(matrix["a"]["b"].correlation, Some(0.0));
        assert_eq!(matrix["a"]["b"].direction.as_deref(), Some("No Correlation"));
        assert_eq!(matrix["a"]["a"].correlation, Some(1.0));
    }

    #[test]
    fn test_pearson() {
        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-9);
        assert!(pearson(&[1.0, 1.0], &[1.0, 2.0]).is_none());
        // rounding-level spread of a constant series is not variance
        assert!(pearson(&[0.1; 3], &[0.4; 3]).is_none());
        assert!(pearson(&[0.7; 5], &[1.0, 2.0, 3.0, 4.0, 5.0]).is_none());
        assert!(pearson(&[], &[]).is_none());
    }

    #[test]
    fn test_incomplete_request_rejected() {
        let mut incomplete = request();
        incomplete.feature_changes.clear();

        let err = LocalAnalysisProvider::new().analyze_now(&incomplete).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Feature analysis error: Missing required data for feature analysis"
        );
    }

    #[test]
    fn test_no_joined_clusters() {
        let mut disjoint = request();
        disjoint.scenario_clusters = vec![ClusterSummary::numbered(99).with_score(1.0)];

        let analysis = LocalAnalysisProvider::new().analyze_now(&disjoint).unwrap();
        assert!(analysis.sensitivity_analysis.unwrap().is_empty());
        let matrix = analysis.correlation_analysis.unwrap();
        assert_eq!(matrix["water_access"]["literacy"].direction.as_deref(), Some("No Correlation"));
    }

    #[tokio::test]
    async fn test_trait_object() {
        let provider: Box<dyn FeatureAnalysisProvider> = Box::new(LocalAnalysisProvider::new());
        assert_eq!(provider.name(), "local");
        assert!(provider.analyze(&request()).await.is_ok());
    }
}
