//! Archive fetch driver.
//!
//! The driver consumes a lazy record sequence from an [`ArchiveSource`] for
//! a bounded time window, deduplicates by `Datetime` as records arrive
//! (first seen wins), and returns a deterministically ordered result. It
//! writes nothing durable; persisting the output is the sync layer's job.

use std::collections::HashSet;

use tracing::debug;

use time::PrimitiveDateTime;
use vantage_types::{DATETIME_FIELD, Record, RecordSet};

use crate::error::Result;
use crate::progress::ProgressSink;
use crate::wire::MAX_ARCHIVE_RECORDS;

/// The time range requested from a console, both bounds inclusive.
///
/// An absent bound means unbounded in that direction. Window boundaries
/// come from user input at minute precision; persisted resume points carry
/// second precision. Both compare fine against record timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchWindow {
    /// Inclusive lower bound.
    pub start: Option<PrimitiveDateTime>,
    /// Inclusive upper bound.
    pub stop: Option<PrimitiveDateTime>,
}

impl FetchWindow {
    /// A window covering the console's entire archive.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A window from `start` (inclusive) with no upper bound.
    pub fn since(start: PrimitiveDateTime) -> Self {
        Self {
            start: Some(start),
            stop: None,
        }
    }

    /// A fully bounded window.
    pub fn between(start: Option<PrimitiveDateTime>, stop: Option<PrimitiveDateTime>) -> Self {
        Self { start, stop }
    }

    /// Whether a timestamp falls inside the window.
    pub fn contains(&self, dt: PrimitiveDateTime) -> bool {
        if let Some(start) = self.start
            && dt < start
        {
            return false;
        }
        if let Some(stop) = self.stop
            && dt > stop
        {
            return false;
        }
        true
    }
}

/// Anything that can stream archive records for a time window.
///
/// The sequence is lazy, finite, and consumed exactly once per call; the
/// source may be asked again with a fresh call. Items are yielded in the
/// order the device produces them, assumed chronological but not relied on.
/// A mid-stream failure surfaces as an `Err` item, distinct from normal
/// end-of-sequence.
pub trait ArchiveSource {
    /// Start streaming records for the given window.
    fn archive_records<'a>(
        &'a mut self,
        window: &FetchWindow,
    ) -> Result<Box<dyn Iterator<Item = Result<Record>> + 'a>>;

    /// Upper-bound estimate of how many records one fetch can yield,
    /// used only for progress reporting.
    fn record_capacity(&self) -> u64 {
        MAX_ARCHIVE_RECORDS
    }
}

/// Fetch a window of archive records, deduplicated and sorted.
///
/// Guarantees on the returned set:
/// - no two records share a `Datetime` (first seen wins),
/// - ascending `Datetime` order regardless of source order,
/// - an empty window yields an empty set, not an error.
pub fn fetch_archives<S>(
    source: &mut S,
    window: &FetchWindow,
    progress: &dyn ProgressSink,
) -> Result<RecordSet>
where
    S: ArchiveSource + ?Sized,
{
    let capacity = source.record_capacity();
    let mut accumulated = RecordSet::new();
    let mut seen: HashSet<String> = HashSet::new();

    let records = source.archive_records(window)?;
    for item in records {
        let record = item?;
        let key = record.datetime_text()?.to_string();
        if seen.insert(key) {
            accumulated.append(record);
        }
        progress.advance(seen.len() as u64, capacity);
    }
    progress.finish();

    debug!("Fetched {} distinct archive records", accumulated.len());
    Ok(accumulated.sorted_by(DATETIME_FIELD, false)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockStation;
    use crate::progress::NoProgress;
    use std::sync::Mutex;
    use time::macros::datetime;
    use vantage_types::datetime::format_seconds;

    fn record(dt: &str, temp: &str) -> Record {
        Record::new().with(DATETIME_FIELD, dt).with("TempOut", temp)
    }

    #[test]
    fn test_window_contains() {
        let window = FetchWindow::between(
            Some(datetime!(2024-01-01 00:00:00)),
            Some(datetime!(2024-01-01 01:00:00)),
        );
        assert!(window.contains(datetime!(2024-01-01 00:00:00)));
        assert!(window.contains(datetime!(2024-01-01 01:00:00)));
        assert!(!window.contains(datetime!(2023-12-31 23:59:59)));
        assert!(!window.contains(datetime!(2024-01-01 01:00:01)));

        assert!(FetchWindow::unbounded().contains(datetime!(1999-01-01 00:00:00)));
    }

    #[test]
    fn test_fetch_dedups_first_seen_wins() {
        let mut station = MockStation::new(vec![
            record("2024-01-01 00:00:00", "20"),
            record("2024-01-01 00:05:00", "21"),
            record("2024-01-01 00:00:00", "99"), // duplicate, must lose
        ]);

        let set = fetch_archives(&mut station, &FetchWindow::unbounded(), &NoProgress).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.first().unwrap().get("TempOut"), Some("20"));
    }

    #[test]
    fn test_fetch_sorts_out_of_order_source() {
        let mut station = MockStation::new(vec![
            record("2024-01-01 00:10:00", "22"),
            record("2024-01-01 00:00:00", "20"),
            record("2024-01-01 00:05:00", "21"),
        ]);

        let set = fetch_archives(&mut station, &FetchWindow::unbounded(), &NoProgress).unwrap();
        let times: Vec<_> = set.iter().map(|r| r.datetime_text().unwrap()).collect();
        assert_eq!(
            times,
            [
                "2024-01-01 00:00:00",
                "2024-01-01 00:05:00",
                "2024-01-01 00:10:00"
            ]
        );
    }

    #[test]
    fn test_fetch_respects_window_bounds() {
        let mut station = MockStation::new(vec![
            record("2024-01-01 00:00:00", "20"),
            record("2024-01-01 00:05:00", "21"),
            record("2024-01-01 00:10:00", "22"),
        ]);

        let window = FetchWindow::between(
            Some(datetime!(2024-01-01 00:05:00)),
            Some(datetime!(2024-01-01 00:05:00)),
        );
        let set = fetch_archives(&mut station, &window, &NoProgress).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.first().unwrap().datetime_text().unwrap(),
            "2024-01-01 00:05:00"
        );
    }

    #[test]
    fn test_empty_window_yields_empty_set() {
        let mut station = MockStation::new(vec![record("2024-01-01 00:00:00", "20")]);

        // start > stop: nothing can match, and that is not an error.
        let window = FetchWindow::between(
            Some(datetime!(2024-02-01 00:00:00)),
            Some(datetime!(2024-01-01 00:00:00)),
        );
        let set = fetch_archives(&mut station, &window, &NoProgress).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_mid_stream_failure_propagates() {
        let mut station = MockStation::new(vec![
            record("2024-01-01 00:00:00", "20"),
            record("2024-01-01 00:05:00", "21"),
        ]);
        station.fail_after(1);

        let err =
            fetch_archives(&mut station, &FetchWindow::unbounded(), &NoProgress).unwrap_err();
        assert!(matches!(err, crate::Error::Connectivity { .. }));
    }

    #[test]
    fn test_progress_sink_sees_distinct_count() {
        struct Recorder(Mutex<Vec<u64>>);
        impl ProgressSink for Recorder {
            fn advance(&self, current: u64, _capacity: u64) {
                self.0.lock().unwrap().push(current);
            }
        }

        let mut station = MockStation::new(vec![
            record("2024-01-01 00:00:00", "20"),
            record("2024-01-01 00:00:00", "20"),
            record("2024-01-01 00:05:00", "21"),
        ]);
        let sink = Recorder(Mutex::new(Vec::new()));
        fetch_archives(&mut station, &FetchWindow::unbounded(), &sink).unwrap();
        assert_eq!(*sink.0.lock().unwrap(), vec![1, 1, 2]);
    }

    #[test]
    fn test_fetch_same_window_twice_is_identical() {
        let start = datetime!(2024-01-01 00:00:00);
        let records: Vec<_> = (0..10)
            .map(|i| {
                record(
                    &format_seconds(start + time::Duration::minutes(5 * i)),
                    &format!("{}", 20 + i),
                )
            })
            .collect();
        let mut station = MockStation::new(records);

        let window = FetchWindow::since(start);
        let first = fetch_archives(&mut station, &window, &NoProgress).unwrap();
        let second = fetch_archives(&mut station, &window, &NoProgress).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
    }
}
