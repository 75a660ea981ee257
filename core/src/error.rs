//! Error types for the SinglePlatform client.
//!
//! # Design
//! Local validation failures (credentials, method, path, parameters) are
//! reported before any request leaves the process. Every non-2xx response,
//! 404 included, lands in `Upstream` with the raw status code and body.

use thiserror::Error;

/// Errors returned by the signer, the request builders and the parsers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials or other required configuration are missing or empty.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The HTTP verb is not one the vendor accepts.
    #[error("unsupported HTTP method: {0}")]
    InvalidMethod(String),

    /// The request path is malformed.
    #[error("invalid request path: {0}")]
    InvalidPath(String),

    /// The request targets an endpoint this client refuses to call.
    #[error("endpoint is excluded: {0}")]
    ExcludedEndpoint(String),

    /// A caller-supplied query parameter collides with a signing parameter.
    #[error("query parameter `{0}` is reserved for request signing")]
    ReservedParameter(String),

    /// The vendor returned a non-success status.
    #[error("HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request could not be delivered.
    #[error("transport failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// True when the error was raised locally, before talking to the vendor.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::Configuration(_)
                | ApiError::InvalidMethod(_)
                | ApiError::InvalidPath(_)
                | ApiError::ExcludedEndpoint(_)
                | ApiError::ReservedParameter(_)
        )
    }

    /// True for a vendor 404, e.g. an unknown location id.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// HTTP status carried by the error, if the vendor produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
