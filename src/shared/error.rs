//! Shared Error Types
//!
//! This module defines the error type returned by every backend collaborator
//! (membership service, canonical feed API, tag service).
//!
//! # Error Categories
//!
//! - `TransientNetwork` - backend unreachable, timed out or answered with a 5xx
//! - `Rejected` - backend refused the request (4xx, malformed request)
//! - `NoIdentity` - the call needs an authenticated identity but none is present
//! - `PartialData` - the call succeeded but the payload could not be decoded
//!
//! # Usage
//!
//! ```rust
//! use favfeed::shared::error::BackendError;
//!
//! let error = BackendError::rejected(400, "unknown tag syntax");
//! assert!(error.is_rejected());
//! ```
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread boundaries.
use thiserror::Error;

/// Errors produced by the remote collaborators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend unreachable, timed out or failed on its side
    #[error("Transient network error: {message}")]
    TransientNetwork {
        /// Human-readable error message
        message: String,
    },

    /// Backend rejected the request
    #[error("Request rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code returned by the backend
        status: u16,
        /// Human-readable error message
        message: String,
    },

    /// Operation requires an identity but none is present
    #[error("No identity available")]
    NoIdentity,

    /// Response arrived but could not be decoded
    #[error("Malformed response: {message}")]
    PartialData {
        /// Human-readable error message
        message: String,
    },
}

impl BackendError {
    /// Create a new transient network error
    pub fn transient(message: impl Into<String>) -> Self {
        Self::TransientNetwork {
            message: message.into(),
        }
    }

    /// Create a new rejection error
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Create a new malformed payload error
    pub fn partial_data(message: impl Into<String>) -> Self {
        Self::PartialData {
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status. Server-side failures are
    /// retryable, everything else is a rejection of the request.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        if status >= 500 {
            Self::transient(format!("status {}: {}", status, message.into()))
        } else {
            Self::rejected(status, message)
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientNetwork { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::partial_data(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::partial_data(err.to_string());
        }
        match err.status() {
            Some(status) => Self::from_status(status.as_u16(), err.to_string()),
            None => Self::transient(err.to_string()),
        }
    }
}
