//! Error types for the store API client.
//!
//! # Design
//! A single `ApiError` covers every way a store call can fail. `NotFound`
//! gets its own variant because callers routinely tell "no such order" apart
//! from other statuses. Every other non-2xx response lands in `Http` with the
//! raw status and body.

use thiserror::Error;

/// Errors returned by `StoreClient` parse methods, `ApiClient` transports and
/// the `StoreApi` proxy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout,
    /// DNS failure).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-success status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status behind the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while loading a `Configuration`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
}
