//! Mock console implementation for testing.
//!
//! [`MockStation`] implements [`ArchiveSource`] so the fetch and sync
//! layers can be exercised without hardware or a TCP bridge.
//!
//! # Features
//!
//! - Canned archive records with window filtering
//! - Failure injection after a configurable number of records
//! - Duplicate injection simply by appending duplicate records

use vantage_types::Record;

use crate::error::{ConnectivityReason, Error, Result};
use crate::fetch::{ArchiveSource, FetchWindow};

/// A mock console holding canned archive records.
///
/// Records whose `Datetime` does not parse at second precision are yielded
/// as `Err` items, matching what a corrupt page produces on a real link.
#[derive(Debug, Clone, Default)]
pub struct MockStation {
    records: Vec<Record>,
    fail_after: Option<usize>,
}

impl MockStation {
    /// Create a mock console with the given archive contents.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            fail_after: None,
        }
    }

    /// Append a record to the canned archive.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Make the stream fail with a connectivity error after yielding
    /// `count` records.
    pub fn fail_after(&mut self, count: usize) {
        self.fail_after = Some(count);
    }
}

impl ArchiveSource for MockStation {
    fn archive_records<'a>(
        &'a mut self,
        window: &FetchWindow,
    ) -> Result<Box<dyn Iterator<Item = Result<Record>> + 'a>> {
        let window = *window;
        let fail_after = self.fail_after;
        let iter = self
            .records
            .iter()
            .filter(move |record| match record.datetime() {
                Ok(dt) => window.contains(dt),
                // Let unparsable records through so the error surfaces
                // where a real link would surface it.
                Err(_) => true,
            })
            .enumerate()
            .map(move |(idx, record)| {
                if let Some(limit) = fail_after
                    && idx >= limit
                {
                    return Err(Error::connectivity(None, ConnectivityReason::LinkClosed));
                }
                record.datetime()?;
                Ok(record.clone())
            });
        Ok(Box::new(iter))
    }

    fn record_capacity(&self) -> u64 {
        self.records.len() as u64
    }
}
