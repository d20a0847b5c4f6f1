use std::path::PathBuf;
use thiserror::Error;

/// Failures of a scan pass. Any of these aborts the whole pass.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scan root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Scan root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Error walking {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("File vanished during scan {path}: {source}")]
    Vanished {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A failed store operation. Nothing from the failed call was committed.
#[derive(Error, Debug)]
#[error("Store operation '{operation}' failed: {source}")]
pub struct PersistenceError {
    pub operation: &'static str,
    #[source]
    pub source: rusqlite::Error,
}

impl PersistenceError {
    pub fn new(operation: &'static str, source: rusqlite::Error) -> Self {
        Self { operation, source }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No library root folder configured or stored")]
    NoRootFolder,

    #[error("Folder is already in the catalog: {0}")]
    AlreadyCatalogued(String),

    #[error("Folder {0} not found")]
    FolderNotFound(i64),

    #[error("File '{file_name}' not found in folder {folder_id}")]
    FileNotFound { folder_id: i64, file_name: String },

    #[error("Collection {0} not found")]
    CollectionNotFound(i64),

    #[error("Catalog has not been loaded")]
    NotLoaded,

    #[error("Catalog is in the error state and must be recreated")]
    Terminal,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
