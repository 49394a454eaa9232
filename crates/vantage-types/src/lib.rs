//! Platform-agnostic record types for Davis Vantage weather stations.
//!
//! This crate provides the shared data model used by the link layer
//! (vantage-core) and the persistence layer (vantage-store).
//!
//! # Features
//!
//! - Flat timestamped archive records with insertion-ordered fields
//! - Ordered record collections with stable field sorting
//! - The two timestamp formats used on the wire and in the store
//! - Error types for record and timestamp parsing
//!
//! # Example
//!
//! ```
//! use vantage_types::{DATETIME_FIELD, Record, RecordSet};
//!
//! let mut set = RecordSet::new();
//! set.append(
//!     Record::new()
//!         .with(DATETIME_FIELD, "2024-01-01 00:05:00")
//!         .with("TempOut", "20.4"),
//! );
//! let sorted = set.sorted_by(DATETIME_FIELD, false)?;
//! assert_eq!(sorted.len(), 1);
//! # Ok::<(), vantage_types::ParseError>(())
//! ```

pub mod datetime;
pub mod error;
pub mod record;

pub use error::{ParseError, ParseResult};
pub use record::{DATETIME_FIELD, Record, RecordSet};
