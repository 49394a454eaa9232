//! Error types for vantage-core.
//!
//! Connectivity failures are fatal to the run that hit them: the core
//! performs no silent recovery and no automatic retry. Callers that want
//! transient-retry behavior wrap the session themselves.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to a Vantage console.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The console link could not be established or was lost.
    #[error("Connection failed: {reason}")]
    Connectivity {
        /// The connection URL, when known.
        url: Option<String>,
        /// The structured reason for the failure.
        reason: ConnectivityReason,
    },

    /// An operation did not complete within the link timeout.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// A frame failed CRC validation.
    #[error("CRC check failed on {operation} frame ({len} bytes)")]
    Crc {
        /// The operation whose reply was corrupted.
        operation: String,
        /// Length of the rejected frame.
        len: usize,
    },

    /// The console answered something other than what the protocol expects.
    #[error("Unexpected response to '{operation}': expected {expected}, got 0x{actual:02X}")]
    UnexpectedResponse {
        /// The command that was issued.
        operation: String,
        /// Human-readable description of the expected reply.
        expected: &'static str,
        /// First unexpected byte received.
        actual: u8,
    },

    /// Data received from the console could not be decoded.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A connection URL could not be parsed.
    #[error("Invalid connection URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL as supplied.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// I/O error on the link.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Record-level parse error.
    #[error(transparent)]
    Parse(#[from] vantage_types::ParseError),
}

/// Structured reasons for connectivity failures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConnectivityReason {
    /// The remote endpoint could not be reached.
    Unreachable(String),
    /// The console never answered the wake-up sequence.
    NoWakeResponse,
    /// The link closed mid-session.
    LinkClosed,
}

impl std::fmt::Display for ConnectivityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable(msg) => write!(f, "console unreachable: {}", msg),
            Self::NoWakeResponse => write!(f, "console did not answer wake-up"),
            Self::LinkClosed => write!(f, "link closed unexpectedly"),
        }
    }
}

impl Error {
    /// Create a connectivity error.
    pub fn connectivity(url: Option<String>, reason: ConnectivityReason) -> Self {
        Self::Connectivity { url, reason }
    }

    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a CRC failure error.
    pub fn crc(operation: impl Into<String>, len: usize) -> Self {
        Self::Crc {
            operation: operation.into(),
            len,
        }
    }

    /// Create an unexpected-response error.
    pub fn unexpected(operation: impl Into<String>, expected: &'static str, actual: u8) -> Self {
        Self::UnexpectedResponse {
            operation: operation.into(),
            expected,
            actual,
        }
    }

    /// Create an invalid-URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using vantage-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::connectivity(
            Some("tcp:station:1111".into()),
            ConnectivityReason::NoWakeResponse,
        );
        assert!(err.to_string().contains("wake-up"));

        let err = Error::timeout("GETTIME", Duration::from_secs(10));
        assert!(err.to_string().contains("GETTIME"));
        assert!(err.to_string().contains("10s"));

        let err = Error::unexpected("DMPAFT", "ACK", 0x21);
        assert!(err.to_string().contains("0x21"));

        let err = Error::crc("LOOP", 99);
        assert!(err.to_string().contains("99 bytes"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("reset by peer"));
    }
}
