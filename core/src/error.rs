//! Error types for the zhconvert client.
//!
//! # Design
//! `ConvertError` mirrors the outcomes of one request/response cycle. Status
//! codes are kept verbatim in `HttpCode`. Failures of the round-trip itself
//! come from the injected transport and are carried as the transport's own
//! error object, so callers can `downcast_ref` it back.

use thiserror::Error;

/// Opaque error produced by a `Transport`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by the converter operations.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The server answered with a status other than 200.
    #[error("HTTP status {0}")]
    HttpCode(u16),

    /// The body is not JSON, or has no string at `data.text`.
    #[error("response is not a JSON object with a string at data.text")]
    MalformedResponse,

    /// The transport reported success without a status code or a body.
    #[error("response is missing a status code or a body")]
    Unknown,

    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
}

impl ConvertError {
    /// Status code of an `HttpCode` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ConvertError::HttpCode(code) => Some(*code),
            _ => None,
        }
    }

    /// The transport's error, if this failure came from the round-trip.
    pub fn transport_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            ConvertError::Transport(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Errors raised while assembling a `ClientConfig`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),

    #[error("unknown body encoding {0:?} (expected \"json\" or \"form\")")]
    UnknownBodyEncoding(String),
}
