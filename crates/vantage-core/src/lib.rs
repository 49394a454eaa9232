//! Console link and archive retrieval for Davis Vantage weather stations.
//!
//! This crate talks the console command protocol over a blocking transport
//! and exposes the station's archive as a lazy record stream. One
//! synchronization run is strictly sequential: records are consumed in the
//! order the console yields them, and nothing here writes durable state.
//!
//! # Features
//!
//! - TCP console links with connection-string parsing (`tcp:host:port`)
//! - Console session: clock, firmware info, archive period, current
//!   conditions, lazy DMPAFT archive download
//! - Archive fetch driver with timestamp deduplication and stable ordering
//! - Injectable progress reporting with a no-op default
//! - A mock console for testing without hardware
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use vantage_core::{FetchWindow, NoProgress, Station, fetch_archives};
//!
//! let mut station = Station::from_url("tcp:192.168.1.18:1111", Duration::from_secs(10))?;
//! let records = fetch_archives(&mut station, &FetchWindow::unbounded(), &NoProgress)?;
//! println!("{} records", records.len());
//! # Ok::<(), vantage_core::Error>(())
//! ```

pub mod error;
pub mod fetch;
pub mod link;
pub mod mock;
pub mod progress;
pub mod station;
pub mod wire;

pub use error::{ConnectivityReason, Error, Result};
pub use fetch::{ArchiveSource, FetchWindow, fetch_archives};
pub use link::{LinkUrl, TcpLink, Transport};
pub use mock::MockStation;
pub use progress::{NoProgress, ProgressSink};
pub use station::{ARCHIVE_PERIODS, ArchiveDump, Station, StationInfo};
pub use wire::MAX_ARCHIVE_RECORDS;
