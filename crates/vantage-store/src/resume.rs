//! Resume-point resolution.
//!
//! The resume point is the timestamp boundary marking where the next fetch
//! should start so already-persisted data is not downloaded again. It is
//! computed from a transient, sorted view of the loaded store; the store
//! file itself is never reordered.

use time::PrimitiveDateTime;
use tracing::debug;

use vantage_types::{DATETIME_FIELD, RecordSet, datetime};

use crate::error::{Error, Result};

/// Compute the inclusive lower bound for the next fetch.
///
/// An empty store means "from the beginning": no lower bound at all.
/// Otherwise the newest record's `Datetime`, parsed at second precision,
/// becomes the bound. A non-empty store whose newest record has a missing
/// or unparsable `Datetime` is fatal for the run, not silently skipped.
pub fn resume_point(records: &RecordSet) -> Result<Option<PrimitiveDateTime>> {
    if records.is_empty() {
        debug!("Store is empty, resuming from the beginning");
        return Ok(None);
    }

    let newest_first = records
        .sorted_by(DATETIME_FIELD, true)
        .map_err(|e| Error::empty_timestamp(e.to_string()))?;
    let newest = newest_first.first().expect("non-empty collection");

    let text = newest
        .datetime_text()
        .map_err(|e| Error::empty_timestamp(e.to_string()))?;
    let point = datetime::parse_seconds(text)
        .map_err(|e| Error::empty_timestamp(e.to_string()))?;

    debug!("Resume point: {}", text);
    Ok(Some(point))
}
