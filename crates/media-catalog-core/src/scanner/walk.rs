use crate::config::DEFAULT_PROGRESS_INTERVAL;
use crate::error::ScanError;
use crate::progress::StatusSink;
use crate::storage::models::{FileRecord, FolderRecord};
use ahash::{AHashMap, AHashSet};
use glob::Pattern;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Glob patterns matched against full paths; matching directories are not entered.
    pub ignore_patterns: Vec<String>,
    /// Files processed between two status updates.
    pub progress_interval: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Flat records produced by one scan pass.
#[derive(Debug, Default)]
pub struct ScanOutput {
    pub folders: Vec<FolderRecord>,
    pub files: Vec<FileRecord>,
    /// Regular files seen, media or not.
    pub files_processed: usize,
    /// Running file counter after this pass: `min_file_id + files.len()`.
    pub last_file_id: i64,
}

impl ScanOutput {
    pub fn last_folder_id(&self) -> Option<i64> {
        self.folders.last().map(|f| f.folder_id)
    }
}

/// Single top-down traversal of `root`.
///
/// Every directory visited, `root` included, gets the next folder id after
/// `min_folder_id` in first-visit order; its parent id is resolved from the
/// directories already visited in this pass. Files whose lower-cased extension
/// is in `valid_extensions` are recorded with their size in whole kilobytes.
/// Any traversal or metadata error aborts the pass.
pub fn scan(
    root: &Path,
    valid_extensions: &AHashSet<String>,
    min_file_id: i64,
    min_folder_id: i64,
    options: &ScanOptions,
    status: &dyn StatusSink,
) -> Result<ScanOutput, ScanError> {
    let root = resolve_root(root)?;
    let ignore_patterns = compile_patterns(&options.ignore_patterns);
    let progress_interval = options.progress_interval.max(1);

    info!("Scanning {} for media files...", root.display());
    status.set_status("Scanning for media files...");
    let started = Instant::now();

    let mut output = ScanOutput {
        last_file_id: min_file_id,
        ..ScanOutput::default()
    };
    let mut next_folder_id = min_folder_id + 1;
    let mut folder_id_map: AHashMap<PathBuf, i64> = AHashMap::new();

    let walker = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_ignored(entry.path(), &ignore_patterns));

    for entry_result in walker {
        let entry = entry_result.map_err(|err| ScanError::Walk {
            path: err.path().unwrap_or(&root).to_path_buf(),
            source: err,
        })?;
        let path = entry.path();

        if entry.file_type().is_dir() {
            let folder_id = next_folder_id;
            next_folder_id += 1;

            let parent_folder_id = if entry.depth() == 0 {
                None
            } else {
                path.parent().and_then(|p| folder_id_map.get(p).copied())
            };

            folder_id_map.insert(path.to_path_buf(), folder_id);
            output.folders.push(FolderRecord {
                folder_id,
                folder_path: path.to_string_lossy().into_owned(),
                parent_folder_id,
            });
            continue;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        output.files_processed += 1;
        if output.files_processed % progress_interval == 0 {
            status.on_scan_progress(output.files_processed, output.files.len());
            status.set_status(&format!(
                "Scanning {} files, found {} media files...",
                output.files_processed,
                output.files.len()
            ));
        }

        let Some(extension) = lowercase_extension(path) else {
            continue;
        };
        if !valid_extensions.contains(&extension) {
            continue;
        }

        let Some((folder_id, folder_path)) = path.parent().and_then(|parent| {
            folder_id_map
                .get(parent)
                .map(|id| (*id, parent.to_string_lossy().into_owned()))
        }) else {
            continue;
        };

        let metadata = entry.metadata().map_err(|err| ScanError::Vanished {
            path: path.to_path_buf(),
            source: io::Error::from(err),
        })?;

        output.files.push(FileRecord {
            folder_id,
            file_name: entry.file_name().to_string_lossy().into_owned(),
            file_extension: extension,
            file_size_kb: (metadata.len() / 1024) as i64,
            folder_path,
        });
    }

    output.last_file_id = min_file_id + output.files.len() as i64;

    let duration = started.elapsed().as_secs_f64();
    status.set_status(&format!(
        "Scanned {} files, found {} media files.",
        output.files_processed,
        output.files.len()
    ));
    status.on_scan_complete(output.folders.len(), output.files.len(), duration);
    debug!(
        "Scan of {} completed in {:.2}s: {} folders, {} files processed, {} media files",
        root.display(),
        duration,
        output.folders.len(),
        output.files_processed,
        output.files.len(),
    );

    Ok(output)
}

/// Canonical form of `root`: absolute, with `..` and symlinks resolved, so one
/// directory always maps to one path string.
pub(crate) fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let resolved =
        fs::canonicalize(root).map_err(|_| ScanError::RootNotFound(root.to_path_buf()))?;
    if !resolved.is_dir() {
        return Err(ScanError::NotADirectory(resolved));
    }
    Ok(resolved)
}

fn compile_patterns(globs: &[String]) -> Vec<Pattern> {
    globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect()
}

fn is_ignored(path: &Path, patterns: &[Pattern]) -> bool {
    patterns.iter().any(|pattern| pattern.matches_path(path))
}

/// `".jpg"` for `a.JPG`; `None` when the name has no extension.
fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}
