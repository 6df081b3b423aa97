//! cluster-compare: compare a scenario clustering run against its baseline
//!
//! Two runs of a spatial clustering over suitability scores label their
//! clusters independently. This crate matches scenario clusters onto baseline
//! identities by centroid proximity, then derives the comparison statistics a
//! what-if view needs: aggregate deltas, per-cluster improvement, feature
//! sensitivity and feature correlation, with a local fallback whenever the
//! remote feature-analysis service is unavailable.

pub mod config;
pub mod engine;
pub mod error;
pub mod matching;
pub mod providers;
pub mod selection;
pub mod session;
pub mod stats;
pub mod types;

pub use config::CompareConfig;
pub use engine::{ComparisonEngine, ComparisonInput};
pub use error::{Error, Result};
pub use matching::{match_clusters, ClusterMatcher, MatchOutcome, MatchStrategy};
pub use providers::{FeatureAnalysisProvider, HttpAnalysisProvider, LocalAnalysisProvider};
pub use selection::{FeatureSelector, JsonFileStore, MemoryStore, SelectionStore};
pub use session::{AnalysisSession, RefreshOutcome};
pub use types::{
    Cluster, ClusterId, ClusterSummary, ComparisonReport, FeatureAnalysis, FeatureChanges,
};
