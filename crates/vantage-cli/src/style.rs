//! Progress display for archive downloads.

use indicatif::{ProgressBar, ProgressStyle};
use vantage_core::{NoProgress, ProgressSink};

/// Standard progress bar characters
const PROGRESS_CHARS: &str = "##-";

/// Get the standard download progress bar style.
fn download_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars(PROGRESS_CHARS)
}

/// Progress sink driving an indicatif bar on stderr.
///
/// The bar's length is not known until the source reports its capacity
/// with the first record, so it starts at zero and is stretched lazily.
pub struct DownloadBar {
    bar: ProgressBar,
}

impl DownloadBar {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(download_style());
        bar.set_message("Downloading archives...");
        Self { bar }
    }
}

impl Default for DownloadBar {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for DownloadBar {
    fn advance(&self, current: u64, capacity: u64) {
        if self.bar.length() != Some(capacity) {
            self.bar.set_length(capacity);
        }
        self.bar.set_position(current);
    }

    fn finish(&self) {
        self.bar.finish_with_message("Download complete");
    }
}

/// Pick a progress sink for a download: a live bar normally, silence
/// with `--quiet`.
pub fn download_sink(quiet: bool) -> Box<dyn ProgressSink> {
    if quiet {
        Box::new(NoProgress)
    } else {
        Box::new(DownloadBar::new())
    }
}
