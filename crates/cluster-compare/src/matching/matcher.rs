//! Greedy nearest-centroid matcher with an identity fast path

use serde::Serialize;

use crate::types::{Cluster, ClusterId};

/// How a scenario run was aligned to the original run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// One of the runs was empty; scenario returned as-is
    Passthrough,
    /// Both runs already share the same cluster numbers; scenario returned as-is
    IdentityPreserved,
    /// Greedy nearest-centroid assignment
    Centroid,
}

/// Matched scenario clusters plus the assignment that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Scenario clusters, in scenario order, carrying matched identities
    pub clusters: Vec<Cluster>,
    /// For each scenario cluster, the index of the original cluster it took
    /// its identity from. Always `None` unless the strategy is `Centroid`.
    pub assignments: Vec<Option<usize>>,
    pub strategy: MatchStrategy,
}

impl MatchOutcome {
    fn unchanged(scenario: &[Cluster], strategy: MatchStrategy) -> Self {
        Self {
            clusters: scenario.to_vec(),
            assignments: vec![None; scenario.len()],
            strategy,
        }
    }

    /// Number of scenario clusters that took an original identity
    pub fn matched_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_some()).count()
    }
}

/// Aligns scenario clusters onto original cluster identities
///
/// Matching is first-come-first-served in scenario order: each scenario
/// cluster claims the nearest original cluster nobody has claimed yet, with
/// ties going to the earlier original. This is not a globally optimal
/// assignment and is kept that way so results stay stable across versions.
pub struct ClusterMatcher;

impl ClusterMatcher {
    /// Match and report how the match was made
    pub fn match_outcome(original: &[Cluster], scenario: &[Cluster]) -> MatchOutcome {
        if original.is_empty() || scenario.is_empty() {
            return MatchOutcome::unchanged(scenario, MatchStrategy::Passthrough);
        }

        if Self::identities_aligned(original, scenario) {
            tracing::debug!(
                "Scenario clusters already carry the original cluster numbers, no remapping needed"
            );
            return MatchOutcome::unchanged(scenario, MatchStrategy::IdentityPreserved);
        }

        tracing::debug!(
            "Matching {} scenario clusters to {} original clusters by centroid",
            scenario.len(),
            original.len()
        );

        let mut used = vec![false; original.len()];
        let mut clusters = Vec::with_capacity(scenario.len());
        let mut assignments = Vec::with_capacity(scenario.len());

        for sc in scenario {
            match Self::nearest_unused(sc, original, &used) {
                Some(index) => {
                    used[index] = true;
                    clusters.push(sc.with_identity_of(&original[index]));
                    assignments.push(Some(index));
                }
                None => {
                    clusters.push(sc.clone());
                    assignments.push(None);
                }
            }
        }

        let outcome = MatchOutcome {
            clusters,
            assignments,
            strategy: MatchStrategy::Centroid,
        };
        tracing::debug!(
            "Centroid matching paired {}/{} scenario clusters",
            outcome.matched_count(),
            scenario.len()
        );
        outcome
    }

    /// Same length and the same multiset of `cluster_number` values
    fn identities_aligned(original: &[Cluster], scenario: &[Cluster]) -> bool {
        if original.len() != scenario.len() {
            return false;
        }
        Self::sorted_numbers(original) == Self::sorted_numbers(scenario)
    }

    fn sorted_numbers(clusters: &[Cluster]) -> Vec<Option<&ClusterId>> {
        let mut numbers: Vec<_> = clusters.iter().map(Cluster::cluster_number).collect();
        numbers.sort();
        numbers
    }

    /// Index of the closest unused original cluster, if any is at finite distance
    fn nearest_unused(sc: &Cluster, original: &[Cluster], used: &[bool]) -> Option<usize> {
        let sc_centroid = sc.centroid()?;
        let mut best: Option<(usize, f64)> = None;

        for (index, oc) in original.iter().enumerate() {
            if used[index] {
                continue;
            }
            let Some(oc_centroid) = oc.centroid() else {
                continue;
            };
            let distance = sc_centroid.planar_distance(oc_centroid);
            // strict: the earliest original wins ties; NaN never wins
            if distance < best.map_or(f64::INFINITY, |(_, d)| d) {
                best = Some((index, distance));
            }
        }

        best.map(|(index, _)| index)
    }
}

/// Align scenario clusters onto original identities
///
/// Returns `scenario` unchanged when either side is empty or when the
/// cluster numbers already line up; otherwise greedily matches by centroid.
/// Inputs are never modified.
pub fn match_clusters(original: &[Cluster], scenario: &[Cluster]) -> Vec<Cluster> {
    ClusterMatcher::match_outcome(original, scenario).clusters
}
