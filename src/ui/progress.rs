//! Progress indicators for long-running operations
//!
//! Uses `linya`; bars draw to stderr so stdout stays clean for `--json` output.

use linya::{Bar, Progress};

/// Progress bar over the entries of the archives being merged
pub struct EntryProgress {
  progress: Progress,
  bar: Bar,
}

impl EntryProgress {
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self { progress, bar }
  }

  /// Advance by one entry
  pub fn inc(&mut self) {
    self.progress.inc_and_draw(&self.bar, 1);
  }
}
