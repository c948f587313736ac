//! Error types for watermirror-core.
//!
//! Every error here is local to one operation: nothing is fatal to the
//! process, and a failed operation leaves previously loaded state intact
//! so the caller can retry.
//!
//! # Error Classes
//!
//! | Error | Class | Recovery |
//! |-------|-------|----------|
//! | [`Error::Http`] | transport | Show message, manual retry |
//! | [`Error::Transport`] | transport | Show message, manual retry |
//! | [`Error::Decode`] | payload | Show message, manual retry |
//! | [`Error::EmptyPayload`] | payload | Show message, manual retry |
//! | [`Error::InvalidUrl`] | configuration | Fix configuration |
//! | [`Error::InvalidConfig`] | configuration | Fix configuration |
//! | [`Error::Cancelled`] | lifecycle | None; the consumer is gone |
//!
//! Nothing is retried automatically. Reaching the end of history during
//! load-more is not an error at all; it is reported as
//! [`SyncOutcome::Exhausted`](crate::history::SyncOutcome::Exhausted).

use thiserror::Error;

/// Errors that can occur while fetching or interpreting sensor data.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The source answered with a non-success HTTP status.
    #[error("HTTP error! status: {status} ({url})")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// The requested URL.
        url: String,
    },

    /// The request never produced a response (DNS, connect, reset, timeout).
    #[error("Source not reachable at {url}: {source}")]
    Transport {
        /// The requested URL.
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The response body was not the expected JSON shape.
    #[error("Invalid response payload: {0}")]
    Decode(String),

    /// The live-reading request returned zero readings.
    #[error("No valid data received")]
    EmptyPayload,

    /// A base URL could not be used.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The consumer of an operation was torn down before it completed.
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Create an HTTP status error.
    pub fn http(status: u16, url: impl Into<String>) -> Self {
        Self::Http {
            status,
            url: url.into(),
        }
    }

    /// Create a transport error from any underlying cause.
    pub fn transport(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether this error belongs to the transport class (HTTP status or
    /// network failure).
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http { .. } | Error::Transport { .. })
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<watermirror_types::ParseError> for Error {
    fn from(err: watermirror_types::ParseError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

/// Result type alias using watermirror-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
