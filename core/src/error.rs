//! Error taxonomy for fetching and navigation.
//!
//! Fetch failures surface unchanged; the navigator wraps nothing and
//! retries nothing. Weight mismatches are warnings, never errors.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::level::NodeKey;

/// Error category for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport or connectivity failure
    Network,
    /// Session missing, invalid or expired (HTTP 401)
    Auth,
    /// Referenced parent no longer exists server-side
    NotFound,
    /// Transition not allowed from the current state or mode
    InvalidTransition,
    /// Any other non-success response from the backend
    Backend,
    /// Local failure before or after the request (session file, config)
    Client,
}

impl ErrorCategory {
    /// Machine-readable code for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Auth => "AUTH_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::Backend => "BACKEND_ERROR",
            Self::Client => "CLIENT_ERROR",
        }
    }

    /// Whether retrying the same request later can succeed without user action.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Backend)
    }
}

/// Errors surfaced by fetchers and the navigator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    #[error("network error: {0}")]
    Network(String),

    #[error("not authenticated: session is missing or expired")]
    Auth,

    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("client error: {0}")]
    Client(String),
}

impl TaxonomyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) => ErrorCategory::Network,
            Self::Auth => ErrorCategory::Auth,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidTransition(_) => ErrorCategory::InvalidTransition,
            Self::Backend { .. } => ErrorCategory::Backend,
            Self::Client(_) => ErrorCategory::Client,
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::InvalidTransition(message.into())
    }
}

/// Result type for fetch and navigation operations.
pub type Result<T> = std::result::Result<T, TaxonomyError>;

/// Locally summed weight disagrees with the backend-supplied total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataIntegrityWarning {
    pub key: NodeKey,
    pub backend_total: u64,
    pub computed: u64,
}

impl fmt::Display for DataIntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reports {} verbs but its loaded children sum to {}",
            self.key, self.backend_total, self.computed
        )
    }
}
