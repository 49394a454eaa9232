//! Incremental merge of fresh archive records into a persisted store.
//!
//! One sync pass initializes the store (creating it empty when absent),
//! derives the resume point, fetches everything newer from the console,
//! and appends only records whose `Datetime` is not already persisted.
//! A pass either completes fully or fails outright; there are no partial
//! commits. Callers must serialize concurrent passes against the same
//! store file externally.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufReader, Write};
use std::path::Path;

use tracing::{debug, info};

use time::PrimitiveDateTime;
use vantage_core::{ArchiveSource, FetchWindow, ProgressSink, fetch_archives};
use vantage_types::{DATETIME_FIELD, RecordSet};

use crate::codec;
use crate::error::Result;
use crate::resume::resume_point;

/// Knobs for one sync pass.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Field delimiter used by the store file.
    pub delimiter: u8,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            delimiter: codec::DEFAULT_DELIMITER,
        }
    }
}

/// What one completed sync pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    /// The resume point used, when the store held data.
    pub resume: Option<PrimitiveDateTime>,
    /// Distinct records the console yielded for the window.
    pub fetched: usize,
    /// Records actually appended after boundary deduplication.
    pub appended: usize,
    /// Records in the store after the pass.
    pub total: usize,
}

/// Run one synchronization pass against the store at `path`.
///
/// The fetch driver only deduplicates within the fresh batch, so records
/// already persisted are excluded here against the full set of stored
/// timestamps; the boundary record at exactly the resume point is the
/// common case. Any error aborts the pass and surfaces unmodified.
pub fn sync_store<S>(
    path: &Path,
    source: &mut S,
    progress: &dyn ProgressSink,
    options: &SyncOptions,
) -> Result<SyncOutcome>
where
    S: ArchiveSource + ?Sized,
{
    debug!("Initializing store {}", path.display());
    let (existing, file_len) = {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;
        let len = file.metadata()?.len();
        (codec::load(BufReader::new(file), options.delimiter)?, len)
    };

    let resume = resume_point(&existing)?;
    let window = match resume {
        Some(start) => FetchWindow::since(start),
        None => FetchWindow::unbounded(),
    };
    debug!("Syncing window {:?}", window);

    let fetched = fetch_archives(source, &window, progress)?;
    let fetched_count = fetched.len();

    let persisted: HashSet<&str> = existing
        .iter()
        .filter_map(|record| record.get(DATETIME_FIELD))
        .collect();
    let fresh: RecordSet = fetched
        .into_iter()
        .filter(|record| {
            record
                .get(DATETIME_FIELD)
                .is_some_and(|t| !persisted.contains(t))
        })
        .collect();
    let appended = fresh.len();

    if !fresh.is_empty() {
        // Serialize the whole batch before touching the file so an append
        // failure cannot leave a partially written row.
        let batch = codec::to_string(&fresh, file_len == 0, options.delimiter)?;
        let mut file = OpenOptions::new().append(true).open(path)?;
        file.write_all(batch.as_bytes())?;
        file.flush()?;
    }

    info!(
        "Sync complete: {} fetched, {} appended, {} total",
        fetched_count,
        appended,
        existing.len() + appended
    );
    Ok(SyncOutcome {
        resume,
        fetched: fetched_count,
        appended,
        total: existing.len() + appended,
    })
}
