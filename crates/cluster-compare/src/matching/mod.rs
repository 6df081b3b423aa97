//! Cross-run cluster matching
//!
//! Two clustering runs label their clusters independently, so cluster 3 in a
//! scenario run need not be cluster 3 of the baseline. The matcher aligns
//! scenario clusters onto baseline identities before any per-cluster delta is
//! computed.

mod matcher;

pub use matcher::{match_clusters, ClusterMatcher, MatchOutcome, MatchStrategy};
