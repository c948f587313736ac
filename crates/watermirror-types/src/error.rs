//! Error types for data parsing in watermirror-types.

use thiserror::Error;

/// Errors that can occur when parsing WaterMirror sensor data.
///
/// This error type is transport-agnostic and does not include
/// HTTP errors (those belong in watermirror-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A timestamp could not be parsed in any accepted format.
    #[error("Invalid timestamp '{0}': expected RFC 3339 or YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),

    /// A timestamp was numerically out of range.
    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(i128),

    /// A parameter name did not match any known parameter.
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
}

/// Result type alias using watermirror-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
