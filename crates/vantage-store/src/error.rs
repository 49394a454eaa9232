//! Error types for vantage-store.
//!
//! A store that fails to parse is never "repaired" or truncated; every
//! error here aborts the run that hit it and surfaces to the caller.

use thiserror::Error;

/// Result type for vantage-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vantage-store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The persisted store cannot be parsed.
    #[error("Malformed store at line {line}: {reason}")]
    Malformed {
        /// 1-based line number in the store file.
        line: usize,
        /// What was wrong with the row.
        reason: String,
    },

    /// The resume point cannot be derived from a non-empty store.
    #[error("Cannot derive resume point: {reason}")]
    EmptyTimestamp {
        /// Why the newest record's timestamp was unusable.
        reason: String,
    },

    /// CSV-level read or write error.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// I/O error on the store file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Record-level error (missing field, bad timestamp).
    #[error(transparent)]
    Parse(#[from] vantage_types::ParseError),

    /// Console error surfaced unmodified through a sync run.
    #[error(transparent)]
    Device(#[from] vantage_core::Error),
}

impl Error {
    /// Create a malformed-store error.
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }

    /// Create an empty-timestamp error.
    pub fn empty_timestamp(reason: impl Into<String>) -> Self {
        Self::EmptyTimestamp {
            reason: reason.into(),
        }
    }
}
