use indicatif::{ProgressBar, ProgressStyle};
use media_catalog_core::StatusSink;
use std::sync::Mutex;
use std::time::Duration;

/// Shows in-progress status messages (those ending in "...") on a spinner and
/// prints final ones as a line once the spinner is cleared.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn update(&self, message: &str) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        match guard.as_ref() {
            Some(pb) => pb.set_message(message.to_string()),
            None => *guard = Some(Self::spinner(message)),
        }
    }

    fn finish(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl StatusSink for CliReporter {
    fn set_status(&self, message: &str) {
        if message.ends_with("...") {
            self.update(message);
        } else {
            self.finish();
            eprintln!("  {}", message);
        }
    }

    fn on_scan_progress(&self, files_processed: usize, media_found: usize) {
        self.update(&format!(
            "Scanning... {} files, {} media files",
            files_processed, media_found
        ));
    }

    fn on_scan_complete(&self, folders: usize, files: usize, duration_secs: f64) {
        self.finish();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} folders, {} media files in {:.2}s",
            folders, files, duration_secs
        );
    }
}

impl Drop for CliReporter {
    fn drop(&mut self) {
        self.finish();
    }
}
