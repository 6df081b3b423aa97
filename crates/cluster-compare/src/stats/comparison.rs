//! Original vs scenario score comparison

use std::collections::HashMap;

use super::summary::{improvement_percent, ScoreSummary};
use crate::matching::match_clusters;
use crate::types::{
    ClassificationCounts, Cluster, ClusterComparisonRow, ClusterId, ClusterStatus,
    ComparisonStats, DistributionBucket,
};

/// Score differences below this are reported as unchanged
pub const UNCHANGED_EPSILON: f64 = 0.01;

/// Classify a matched pair by its score difference
pub fn classify(original_score: f64, scenario_score: f64) -> ClusterStatus {
    let diff = scenario_score - original_score;
    if diff.abs() < UNCHANGED_EPSILON {
        ClusterStatus::Unchanged
    } else if diff > 0.0 {
        ClusterStatus::Improved
    } else {
        ClusterStatus::Declined
    }
}

/// Original clusters keyed by resolved identity; later duplicates win
fn index_by_identity(clusters: &[Cluster]) -> HashMap<&ClusterId, &Cluster> {
    clusters.iter().map(|c| (&c.identity, c)).collect()
}

/// Pairs of (original, matched scenario) joined on identity, in scenario order
pub fn joined_pairs<'a>(
    original: &'a [Cluster],
    matched_scenario: &'a [Cluster],
) -> Vec<(&'a Cluster, &'a Cluster)> {
    let lookup = index_by_identity(original);
    matched_scenario
        .iter()
        .filter_map(|sc| lookup.get(&sc.identity).map(|oc| (*oc, sc)))
        .collect()
}

/// Count improved/declined/unchanged among matched pairs
pub fn classify_pairs(original: &[Cluster], matched_scenario: &[Cluster]) -> ClassificationCounts {
    let mut counts = ClassificationCounts::default();
    for (oc, sc) in joined_pairs(original, matched_scenario) {
        counts.record(classify(oc.avg_score(), sc.avg_score()));
    }
    counts
}

/// Aggregate statistics for both runs
///
/// Matches the scenario onto the original first. All aggregates are `None`
/// when either run is empty.
pub fn comparison_stats(original: &[Cluster], scenario: &[Cluster]) -> ComparisonStats {
    if original.is_empty() || scenario.is_empty() {
        return ComparisonStats::default();
    }

    let matched = match_clusters(original, scenario);
    let original_scores: Vec<f64> = original.iter().map(Cluster::avg_score).collect();
    let scenario_scores: Vec<f64> = matched.iter().map(Cluster::avg_score).collect();

    let original_summary = ScoreSummary::from_scores(&original_scores);
    let scenario_summary = ScoreSummary::from_scores(&scenario_scores);
    let classification = classify_pairs(original, &matched);

    let improvement = match (&original_summary, &scenario_summary) {
        (Some(o), Some(s)) => Some(improvement_percent(o.mean, s.mean)),
        _ => None,
    };

    ComparisonStats {
        original_avg: original_summary.map(|s| s.mean),
        scenario_avg: scenario_summary.map(|s| s.mean),
        improvement,
        original_median: original_summary.map(|s| s.median),
        scenario_median: scenario_summary.map(|s| s.median),
        original_std_dev: original_summary.map(|s| s.std_dev),
        scenario_std_dev: scenario_summary.map(|s| s.std_dev),
        total_clusters: original.len(),
        improved_clusters: classification.improved,
        declined_clusters: classification.declined,
        unchanged_clusters: classification.unchanged,
    }
}

/// Per-cluster rows, sorted by improvement, best first
pub fn cluster_comparison_rows(
    original: &[Cluster],
    matched_scenario: &[Cluster],
) -> Vec<ClusterComparisonRow> {
    let mut rows: Vec<ClusterComparisonRow> = joined_pairs(original, matched_scenario)
        .into_iter()
        .map(|(oc, sc)| {
            let original_score = oc.avg_score();
            let scenario_score = sc.avg_score();
            let improvement = improvement_percent(original_score, scenario_score);
            let improvement = if improvement.is_nan() { 0.0 } else { improvement };

            ClusterComparisonRow {
                cluster: sc.identity.to_string(),
                original: original_score,
                scenario: scenario_score,
                improvement,
                status: ClusterStatus::from_improvement(improvement),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.improvement.total_cmp(&a.improvement));
    rows
}

/// Improving / Declining / Stable counts over comparison rows
///
/// Buckets overlap: a row with a small positive change is both Improving and
/// Stable.
pub fn improvement_distribution(
    rows: &[ClusterComparisonRow],
    stable_threshold_percent: f64,
) -> Vec<DistributionBucket> {
    let improving = rows.iter().filter(|r| r.improvement > 0.0).count();
    let declining = rows.iter().filter(|r| r.improvement < 0.0).count();
    let stable = rows
        .iter()
        .filter(|r| r.improvement.abs() < stable_threshold_percent)
        .count();

    [("Improving", improving), ("Declining", declining), ("Stable", stable)]
        .into_iter()
        .map(|(name, value)| DistributionBucket {
            name: name.to_string(),
            value,
        })
        .collect()
}
