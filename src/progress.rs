//! Progress reporting for snapshot operations.
//!
//! Snapshot creation, restore and verification all accept a
//! [`ProgressReporter`]; callers that do not care pass [`NoProgress`].
//! Returning `false` from [`ProgressReporter::on_progress`] requests
//! cancellation before the next entry is processed.
//!
//! # Example
//!
//! ```rust,ignore
//! use treesnap::progress::StatisticsProgress;
//! use treesnap::{WriteOptions, create_snapshot};
//!
//! let mut progress = StatisticsProgress::new();
//! create_snapshot(&source, &output, &WriteOptions::new(), &mut progress)?;
//! println!("{} entries", progress.entries_processed);
//! ```

use std::time::{Duration, Instant};

const BYTES_KB: f64 = 1024.0;
const BYTES_MB: f64 = BYTES_KB * 1024.0;
const BYTES_GB: f64 = BYTES_MB * 1024.0;

/// Progress callbacks for snapshot operations.
///
/// Every method has a no-op default, so implementors override only what
/// they display.
pub trait ProgressReporter: Send {
    /// Called once at the start with the total bytes to process.
    fn on_total(&mut self, total_bytes: u64) {
        let _ = total_bytes;
    }

    /// Called after each entry with cumulative bytes processed.
    ///
    /// Returns `true` to continue or `false` to request cancellation.
    fn on_progress(&mut self, bytes_processed: u64, total_bytes: u64) -> bool {
        let _ = (bytes_processed, total_bytes);
        true
    }

    /// Called when an entry (file or empty directory) starts processing.
    fn on_entry_start(&mut self, entry_name: &str, size: u64) {
        let _ = (entry_name, size);
    }

    /// Called when an entry finishes, successfully or not.
    fn on_entry_complete(&mut self, entry_name: &str, success: bool) {
        let _ = (entry_name, success);
    }

    /// Called when an entry is skipped or degraded but the operation
    /// continues.
    fn on_warning(&mut self, message: &str) {
        let _ = message;
    }
}

/// A progress reporter that does nothing.
#[derive(Debug, Default, Clone)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// A progress reporter that collects statistics.
#[derive(Debug, Clone)]
pub struct StatisticsProgress {
    /// Total bytes to process.
    pub total_bytes: u64,
    /// Bytes processed so far.
    pub processed_bytes: u64,
    /// Entry currently being processed.
    pub current_entry: Option<String>,
    /// Number of entries completed.
    pub entries_processed: usize,
    /// Warnings collected.
    pub warnings: Vec<String>,
    /// Set to request cancellation.
    pub cancelled: bool,
    start_time: Instant,
}

impl Default for StatisticsProgress {
    fn default() -> Self {
        Self {
            total_bytes: 0,
            processed_bytes: 0,
            current_entry: None,
            entries_processed: 0,
            warnings: Vec::new(),
            cancelled: false,
            start_time: Instant::now(),
        }
    }
}

impl StatisticsProgress {
    /// Creates a new statistics progress reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the completion percentage (0.0 - 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            (self.processed_bytes as f64 / self.total_bytes as f64) * 100.0
        }
    }

    /// Returns elapsed time since creation.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the processing rate in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            0.0
        } else {
            self.processed_bytes as f64 / elapsed
        }
    }
}

impl ProgressReporter for StatisticsProgress {
    fn on_total(&mut self, total_bytes: u64) {
        self.total_bytes = total_bytes;
    }

    fn on_progress(&mut self, bytes_processed: u64, _total_bytes: u64) -> bool {
        self.processed_bytes = bytes_processed;
        !self.cancelled
    }

    fn on_entry_start(&mut self, entry_name: &str, _size: u64) {
        self.current_entry = Some(entry_name.to_string());
    }

    fn on_entry_complete(&mut self, _entry_name: &str, _success: bool) {
        self.entries_processed += 1;
        self.current_entry = None;
    }

    fn on_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}

/// A progress reporter that calls a closure.
pub struct ClosureProgress<F> {
    callback: F,
}

impl<F> ClosureProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    /// Creates a progress reporter from a closure.
    ///
    /// The closure receives (bytes_processed, total_bytes) and returns
    /// `true` to continue or `false` to cancel.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    fn on_progress(&mut self, bytes_processed: u64, total_bytes: u64) -> bool {
        (self.callback)(bytes_processed, total_bytes)
    }
}

/// Creates a closure-based progress reporter.
pub fn progress_fn<F>(f: F) -> ClosureProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    ClosureProgress::new(f)
}

/// Formats bytes as a human-readable string using IEC units (KiB, MiB, GiB).
///
/// # Examples
///
/// ```rust
/// use treesnap::progress::format_bytes_iec;
///
/// assert_eq!(format_bytes_iec(0), "0 B");
/// assert_eq!(format_bytes_iec(1536), "1.5 KiB");
/// assert_eq!(format_bytes_iec(1048576), "1.0 MiB");
/// ```
pub fn format_bytes_iec(bytes: u64) -> String {
    let bytes_f64 = bytes as f64;
    if bytes_f64 < BYTES_KB {
        format!("{} B", bytes)
    } else if bytes_f64 < BYTES_MB {
        format!("{:.1} KiB", bytes_f64 / BYTES_KB)
    } else if bytes_f64 < BYTES_GB {
        format!("{:.1} MiB", bytes_f64 / BYTES_MB)
    } else {
        format!("{:.1} GiB", bytes_f64 / BYTES_GB)
    }
}

/// Formats a duration as a human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
