use std::path::PathBuf;

/// Receives human-readable status updates during scan, load and save.
///
/// The CLI implements it with an indicatif spinner; a GUI would forward to its
/// status bar. Fire-and-forget: nothing is returned to the caller.
/// All methods have default no-op implementations.
pub trait StatusSink {
    fn set_status(&self, _message: &str) {}
    fn on_scan_progress(&self, _files_processed: usize, _media_found: usize) {}
    fn on_scan_complete(&self, _folders: usize, _files: usize, _duration_secs: f64) {}
}

/// No-op status sink for silent operation.
pub struct SilentSink;

impl StatusSink for SilentSink {}

impl<F> StatusSink for F
where
    F: Fn(&str),
{
    fn set_status(&self, message: &str) {
        self(message)
    }
}

/// Questions put to the user, e.g. whether to scan an empty catalog.
pub trait Prompt {
    fn confirm(&self, question: &str) -> bool;

    /// Asks for a directory; `None` when the user gives none.
    fn choose_folder(&self, _question: &str) -> Option<PathBuf> {
        None
    }
}

impl<F> Prompt for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, question: &str) -> bool {
        self(question)
    }
}
