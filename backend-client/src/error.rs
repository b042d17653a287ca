use thiserror::Error;
use verbnav_core::TaxonomyError;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP 401. The stored token has already been removed.
    #[error("not authenticated: session is missing or expired")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid response body (HTTP {status}): {source}")]
    Parse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("session storage error: {0}")]
    Storage(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;

impl From<BackendError> for TaxonomyError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Network(e) => TaxonomyError::Network(e.to_string()),
            BackendError::Unauthorized => TaxonomyError::Auth,
            BackendError::NotFound(resource) => TaxonomyError::NotFound { resource },
            BackendError::Api { status, message } => TaxonomyError::Backend { status, message },
            BackendError::Parse { status, source } => TaxonomyError::Backend {
                status,
                message: format!("invalid response body: {source}"),
            },
            BackendError::Storage(message) | BackendError::InvalidConfig(message) => {
                TaxonomyError::Client(message)
            }
        }
    }
}
