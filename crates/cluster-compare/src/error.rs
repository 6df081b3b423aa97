//! Error types for cluster comparison

use thiserror::Error;

/// Result type alias for comparison operations
pub type Result<T> = std::result::Result<T, Error>;

/// Cluster comparison errors
///
/// The matcher and the statistics functions never produce these; degenerate
/// input there yields sentinel values. Errors only come from I/O, configuration
/// and the feature-analysis providers.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Feature analysis failed (service rejected the request or returned garbage)
    #[error("Feature analysis error: {0}")]
    Analysis(String),

    /// Feature selector storage error
    #[error("Selection storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a feature analysis error
    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this failure came from talking to the analysis service
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Analysis(_))
    }
}
