//! CSV record store and incremental sync for Davis Vantage archive data.
//!
//! The store is a durable, append-only delimited text file holding one
//! archive record per row. This crate provides the codec between that
//! file and an in-memory [`RecordSet`](vantage_types::RecordSet), the
//! resume-point resolver, and the merge controller that drives one
//! synchronization pass end to end.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use vantage_core::{NoProgress, Station};
//! use vantage_store::{SyncOptions, sync_store};
//!
//! let mut station = Station::from_url("tcp:192.168.1.18:1111", Duration::from_secs(10))?;
//! let outcome = sync_store(
//!     Path::new("weather.csv"),
//!     &mut station,
//!     &NoProgress,
//!     &SyncOptions::default(),
//! )?;
//! println!("{} new records", outcome.appended);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
mod error;
mod resume;
mod sync;

pub use codec::DEFAULT_DELIMITER;
pub use error::{Error, Result};
pub use resume::resume_point;
pub use sync::{SyncOptions, SyncOutcome, sync_store};
