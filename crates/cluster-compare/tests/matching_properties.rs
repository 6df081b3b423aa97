//! Property tests for the cluster matcher

use std::collections::HashSet;

use cluster_compare::{Cluster, ClusterMatcher, ClusterSummary, MatchStrategy};
use proptest::prelude::*;

type RawCluster = (Option<(f64, f64)>, f64);

fn raw_clusters(max: usize) -> impl Strategy<Value = Vec<RawCluster>> {
    prop::collection::vec(
        (
            prop::option::weighted(0.85, (-180.0f64..180.0, -90.0f64..90.0)),
            0.0f64..100.0,
        ),
        0..max,
    )
}

/// Clusters numbered from `first`
fn build(raw: &[RawCluster], first: i64) -> Vec<Cluster> {
    Cluster::normalize_all(
        raw.iter()
            .enumerate()
            .map(|(i, (centroid, score))| {
                let summary = ClusterSummary::numbered(first + i as i64).with_score(*score);
                match centroid {
                    Some((lon, lat)) => summary.with_centroid(*lon, *lat),
                    None => summary,
                }
            })
            .collect(),
    )
}

proptest! {
    /// No original identity is handed out twice
    #[test]
    fn each_original_claimed_at_most_once(
        original in raw_clusters(12),
        scenario in raw_clusters(12),
    ) {
        let original = build(&original, 0);
        let scenario = build(&scenario, 1000);
        let outcome = ClusterMatcher::match_outcome(&original, &scenario);

        let claimed: Vec<usize> = outcome.assignments.iter().flatten().copied().collect();
        let unique: HashSet<usize> = claimed.iter().copied().collect();
        prop_assert_eq!(claimed.len(), unique.len());
        prop_assert!(outcome.matched_count() <= original.len().min(scenario.len()));
    }

    /// Output has the scenario's length, order and scores
    #[test]
    fn scenario_shape_preserved(
        original in raw_clusters(10),
        scenario in raw_clusters(10),
    ) {
        let original = build(&original, 0);
        let scenario = build(&scenario, 1000);
        let outcome = ClusterMatcher::match_outcome(&original, &scenario);

        prop_assert_eq!(outcome.clusters.len(), scenario.len());
        for (matched, source) in outcome.clusters.iter().zip(&scenario) {
            prop_assert_eq!(
                matched.summary.avg_suitability_score,
                source.summary.avg_suitability_score
            );
            prop_assert_eq!(matched.centroid(), source.centroid());
        }
    }

    /// Matched clusters carry the original's identity; the rest keep their own
    #[test]
    fn identities_come_from_assignments(
        original in raw_clusters(10),
        scenario in raw_clusters(10),
    ) {
        let original = build(&original, 0);
        let scenario = build(&scenario, 1000);
        let outcome = ClusterMatcher::match_outcome(&original, &scenario);

        for (i, assignment) in outcome.assignments.iter().enumerate() {
            match assignment {
                Some(index) => {
                    prop_assert_eq!(&outcome.clusters[i].identity, &original[*index].identity);
                }
                None => {
                    prop_assert_eq!(&outcome.clusters[i], &scenario[i]);
                }
            }
        }
    }

    /// Scenario clusters without a centroid are never remapped
    #[test]
    fn missing_centroid_passes_through(
        original in raw_clusters(8),
        scenario in raw_clusters(8),
    ) {
        let original = build(&original, 0);
        let scenario = build(&scenario, 1000);
        let outcome = ClusterMatcher::match_outcome(&original, &scenario);

        for (i, sc) in scenario.iter().enumerate() {
            if sc.centroid().is_none() {
                prop_assert_eq!(outcome.assignments[i], None);
                prop_assert_eq!(&outcome.clusters[i], sc);
            }
        }
    }

    /// Same cluster numbers on both sides: scenario returned untouched
    #[test]
    fn shared_numbers_skip_matching(
        raw in raw_clusters(10),
        rotate in 0usize..10,
    ) {
        let original = build(&raw, 0);
        let mut scenario = build(&raw, 0);
        if !scenario.is_empty() {
            let by = rotate % scenario.len();
            scenario.rotate_left(by);
        }

        let outcome = ClusterMatcher::match_outcome(&original, &scenario);
        prop_assert_eq!(&outcome.clusters, &scenario);
        if !original.is_empty() {
            prop_assert_eq!(outcome.strategy, MatchStrategy::IdentityPreserved);
        }
    }

    /// An empty run on either side leaves the scenario as it was
    #[test]
    fn empty_side_is_passthrough(raw in raw_clusters(10)) {
        let clusters = build(&raw, 0);

        let outcome = ClusterMatcher::match_outcome(&[], &clusters);
        prop_assert_eq!(&outcome.clusters, &clusters);
        prop_assert_eq!(outcome.strategy, MatchStrategy::Passthrough);

        let outcome = ClusterMatcher::match_outcome(&clusters, &[]);
        prop_assert!(outcome.clusters.is_empty());
    }
}
