//! Feature analysis providers
//!
//! The per-feature sensitivity and correlation analysis can come from the
//! remote analysis service (`HttpAnalysisProvider`) or be computed in-process
//! (`LocalAnalysisProvider`). Both answer with the same `FeatureAnalysis` shape.

pub mod http;
pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{FeatureAnalysis, FeatureAnalysisRequest};

pub use http::HttpAnalysisProvider;
pub use local::LocalAnalysisProvider;

/// Trait for per-feature analysis backends
///
/// Implementations:
/// - `HttpAnalysisProvider`: `POST /api/feature-analysis` on the analysis service
/// - `LocalAnalysisProvider`: same statistics computed in-process
#[async_trait]
pub trait FeatureAnalysisProvider: Send + Sync {
    /// Analyze how the configured feature changes moved cluster scores
    async fn analyze(&self, request: &FeatureAnalysisRequest) -> Result<FeatureAnalysis>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
