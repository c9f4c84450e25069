//! Progress bar implementation for CLI operations.

use indicatif::{ProgressBar, ProgressStyle};
use treesnap::progress::ProgressReporter;

/// Progress display wired into the snapshot pipeline.
pub struct CliProgress {
    bar: ProgressBar,
    quiet: bool,
}

impl CliProgress {
    /// Creates a new progress display.
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {wide_msg}",
                    )
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb
        };
        Self { bar, quiet }
    }

    /// Finishes the progress display with a message.
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        if !self.quiet {
            self.bar.finish_with_message(msg.into());
        }
    }

    /// Clears the bar, for runs that end in an error.
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn on_total(&mut self, total_bytes: u64) {
        self.bar.set_length(total_bytes);
    }

    fn on_progress(&mut self, bytes_processed: u64, _total_bytes: u64) -> bool {
        self.bar.set_position(bytes_processed);
        true
    }

    fn on_entry_start(&mut self, entry_name: &str, _size: u64) {
        self.bar.set_message(entry_name.to_string());
    }

    fn on_warning(&mut self, message: &str) {
        if !self.quiet {
            self.bar.println(format!("warning: {}", message));
        }
    }
}
