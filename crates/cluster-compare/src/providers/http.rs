//! HTTP client for the remote feature analysis service

use async_trait::async_trait;
use reqwest::Client;

use crate::config::AnalysisServiceConfig;
use crate::error::{Error, Result};
use crate::types::{FeatureAnalysis, FeatureAnalysisRequest};

use super::FeatureAnalysisProvider;

/// Feature analysis over HTTP
///
/// One attempt per request; a failed call is reported to the caller, which
/// falls back to locally estimated statistics.
pub struct HttpAnalysisProvider {
    client: Client,
    url: String,
}

impl HttpAnalysisProvider {
    /// Create a client for the configured service
    pub fn new(config: &AnalysisServiceConfig) -> Result<Self> {
        let mut builder = Client::builder().pool_max_idle_per_host(2);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: config.feature_analysis_url(),
        })
    }

    /// Endpoint this provider posts to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeatureAnalysisProvider for HttpAnalysisProvider {
    async fn analyze(&self, request: &FeatureAnalysisRequest) -> Result<FeatureAnalysis> {
        tracing::info!(
            "Requesting feature analysis from {} ({} original, {} scenario clusters, {} features)",
            self.url,
            request.original_clusters.len(),
            request.scenario_clusters.len(),
            request.features.len()
        );

        let response = self.client.post(&self.url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::analysis(format!("HTTP {} - {}", status, body)));
        }

        let analysis: FeatureAnalysis = response
            .json()
            .await
            .map_err(|e| {
                Error::analysis(format!("Failed to parse feature analysis response: {}", e))
            })?;

        if let Some(message) = &analysis.message {
            tracing::debug!("Analysis service: {}", message);
        }
        Ok(analysis)
    }

    fn name(&self) -> &str {
        "http"
    }
}
