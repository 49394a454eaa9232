//! Progress reporting during archive downloads.
//!
//! The fetch driver is agnostic to how (or whether) progress is shown; it
//! just notifies whatever sink was injected. The default sink does nothing,
//! and the driver behaves identically with it.

/// Observer notified as archive records arrive.
pub trait ProgressSink {
    /// Called after each record with the running count and an upper-bound
    /// estimate (the console's archive capacity unless the source knows
    /// better).
    fn advance(&self, current: u64, capacity: u64) {
        let _ = (current, capacity);
    }

    /// Called once the source is exhausted.
    fn finish(&self) {}
}

/// A sink that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_no_progress_is_a_no_op() {
        let sink = NoProgress;
        sink.advance(1, 2560);
        sink.finish();
    }

    #[test]
    fn test_custom_sink_receives_counts() {
        struct Counting(AtomicU64);
        impl ProgressSink for Counting {
            fn advance(&self, current: u64, _capacity: u64) {
                self.0.store(current, Ordering::SeqCst);
            }
        }

        let sink = Counting(AtomicU64::new(0));
        sink.advance(7, 2560);
        assert_eq!(sink.0.load(Ordering::SeqCst), 7);
    }
}
