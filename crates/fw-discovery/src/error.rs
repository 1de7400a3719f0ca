//! Error types for widget discovery

use thiserror::Error;

/// Errors raised while listing or fetching extension widgets
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A full reload is already running
    #[error("a widget reload is already in progress")]
    ReloadInProgress,

    /// Transport failure talking to the extension backend
    #[error("request to {url} failed: {message}")]
    Request {
        /// Requested URL
        url: String,
        /// Client error text
        message: String,
    },

    /// Backend answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Base URL cannot carry path segments
    #[error("invalid extension base url '{0}'")]
    InvalidBaseUrl(String),

    /// Extension or widget file does not exist
    #[error("extension '{extension_id}' has no widget file '{file}'")]
    NotFound {
        /// Extension id
        extension_id: String,
        /// Requested file name, empty when the extension itself is missing
        file: String,
    },

    /// Fixture file could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Response or fixture body is not the expected JSON
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DiscoveryError {
    pub(crate) fn request(url: impl Into<String>, err: &reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for discovery operations
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
