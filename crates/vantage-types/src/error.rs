//! Error types for record handling in vantage-types.

use thiserror::Error;

/// Errors that can occur when working with archive records.
///
/// This error type is platform-agnostic and does not include link-level
/// errors (those belong in vantage-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A record does not carry the requested field.
    #[error("Field not found: {field}")]
    FieldNotFound {
        /// Name of the missing field.
        field: String,
    },

    /// A timestamp value could not be parsed.
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp {
        /// The offending text value.
        value: String,
        /// Why parsing failed.
        reason: String,
    },
}

impl ParseError {
    /// Create a field-not-found error.
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
        }
    }

    /// Create an invalid-timestamp error.
    pub fn invalid_timestamp(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using vantage-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
