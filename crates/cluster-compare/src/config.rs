//! Configuration for cluster comparison

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// Main comparison configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Feature analysis service configuration
    #[serde(default)]
    pub analysis: AnalysisServiceConfig,
    /// Comparison statistics configuration
    #[serde(default)]
    pub comparison: ComparisonConfig,
    /// Feature selector persistence
    #[serde(default)]
    pub selection: SelectionConfig,
}

impl CompareConfig {
    /// Load configuration from a TOML file; absent sections keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Feature analysis service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisServiceConfig {
    /// Service base URL (default: http://localhost:5000)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Call the service at all (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Request timeout in seconds; unset leaves the HTTP client default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Run the analysis in-process instead of over HTTP (default: false)
    #[serde(default)]
    pub prefer_local: bool,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_enabled() -> bool {
    true
}

impl Default for AnalysisServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            enabled: true,
            timeout_secs: None,
            prefer_local: false,
        }
    }
}

impl AnalysisServiceConfig {
    /// Full URL of the feature analysis endpoint
    pub fn feature_analysis_url(&self) -> String {
        format!("{}/api/feature-analysis", self.base_url.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Comparison statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// |improvement| below this percentage counts as Stable (default: 5.0)
    #[serde(default = "default_stable_threshold")]
    pub stable_threshold_percent: f64,
}

fn default_stable_threshold() -> f64 {
    5.0
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            stable_threshold_percent: default_stable_threshold(),
        }
    }
}

/// Feature selector persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Where the feature selector state is saved
    #[serde(default = "default_selection_path")]
    pub storage_path: PathBuf,
}

fn default_selection_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cluster-compare")
        .join("feature_selector.json")
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            storage_path: default_selection_path(),
        }
    }
}
