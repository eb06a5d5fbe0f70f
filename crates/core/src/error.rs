//! Vendor Client Errors
//!
//! `ClientError` is what a `VendorClient` implementation reports when a call
//! does not return a record. The variant matters for verdicts: `NotFound`
//! and `Api` are domain outcomes and end up inside a check; `Transport` and
//! `Parse` are unexpected and propagate to the caller untouched.

use thiserror::Error;

/// Errors surfaced by a vendor client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The resource does not exist (HTTP 404), or does not exist yet
    #[error("{resource} {sid} not found")]
    NotFound { resource: String, sid: String },

    /// The vendor answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// The request never completed (connection reset, DNS, TLS, ...)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The response could not be decoded
    #[error("Parse error: {message}")]
    Parse { message: String },
}

/// Result type alias for vendor client calls
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Create a not found error
    pub fn not_found(resource: impl Into<String>, sid: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            sid: sid.into(),
        }
    }

    /// Create an API error
    pub fn api(status: u16, code: Option<i64>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code,
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Whether this is a 404, either the dedicated variant or an API error carrying 404.
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::NotFound { .. } => true,
            ClientError::Api { status, .. } => *status == 404,
            _ => false,
        }
    }

    /// Whether this error means the client itself misbehaved rather than the
    /// vendor reporting a domain outcome.
    pub fn is_unexpected(&self) -> bool {
        matches!(
            self,
            ClientError::Transport { .. } | ClientError::Parse { .. }
        )
    }

    /// Vendor error code, if the vendor supplied one.
    pub fn vendor_code(&self) -> Option<i64> {
        match self {
            ClientError::Api { code, .. } => *code,
            _ => None,
        }
    }
}
