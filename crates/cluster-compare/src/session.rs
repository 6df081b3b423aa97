//! Latest-analysis holder with a request sequence guard
//!
//! Each refresh takes a ticket from a monotonic counter. A response is only
//! applied while its ticket is still the newest one issued, so a slow reply to
//! an older input can never overwrite the analysis of a newer input.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::engine::ComparisonInput;
use crate::providers::FeatureAnalysisProvider;
use crate::types::FeatureAnalysis;

/// What a refresh did to the stored analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Response stored as the latest analysis
    Applied,
    /// A newer refresh started meanwhile; response discarded
    Stale,
    /// Provider failed; stored analysis cleared so reports fall back
    Failed,
    /// Input incomplete; no request sent and stored analysis cleared
    Skipped,
}

/// Shared analysis state for one comparison view
#[derive(Clone, Default)]
pub struct AnalysisSession {
    inner: Arc<SessionInner>,
}

#[derive(Default)]
struct SessionInner {
    /// Last ticket issued
    sequence: AtomicU64,
    /// Latest applied analysis
    latest: RwLock<Option<FeatureAnalysis>>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest applied analysis, if any
    pub fn latest(&self) -> Option<FeatureAnalysis> {
        self.inner.latest.read().clone()
    }

    pub fn clear(&self) {
        *self.inner.latest.write() = None;
    }

    fn issue_ticket(&self) -> u64 {
        self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.inner.sequence.load(Ordering::SeqCst) == ticket
    }

    /// Fetch a fresh analysis for `input`
    ///
    /// Never fails: provider errors and incomplete input leave the session
    /// without an analysis.
    pub async fn refresh(
        &self,
        provider: &dyn FeatureAnalysisProvider,
        input: &ComparisonInput,
    ) -> RefreshOutcome {
        let ticket = self.issue_ticket();

        if !input.is_analyzable() {
            tracing::debug!("Skipping feature analysis (ticket {}): incomplete input", ticket);
            let mut latest = self.inner.latest.write();
            if self.is_current(ticket) {
                *latest = None;
            }
            return RefreshOutcome::Skipped;
        }

        let request = input.analysis_request();
        let result = provider.analyze(&request).await;

        if !self.is_current(ticket) {
            tracing::warn!(
                "Discarding stale feature analysis from {} (ticket {})",
                provider.name(),
                ticket
            );
            return RefreshOutcome::Stale;
        }

        let mut latest = self.inner.latest.write();
        // re-check under the lock; a newer refresh may have applied meanwhile
        if !self.is_current(ticket) {
            return RefreshOutcome::Stale;
        }
        match result {
            Ok(analysis) => {
                *latest = Some(analysis);
                RefreshOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(
                    "Feature analysis from {} failed, using fallback estimates: {}",
                    provider.name(),
                    e
                );
                *latest = None;
                RefreshOutcome::Failed
            }
        }
    }
}
