use crate::catalog::{Catalog, OutlineRow};
use crate::config::AppConfig;
use crate::error::{Error, PersistenceError, Result};
use crate::progress::{Prompt, StatusSink};
use crate::registry::ExtensionRegistry;
use crate::scanner::{self, ScanOptions, ScanOutput};
use crate::storage::models::{Collection, FileRecord, Folder, FolderRecord, MediaFile};
use crate::storage::{CatalogStore, ROOT_FOLDER_PARAMETER};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const SCAN_PROMPT: &str = "No media data found. Scan now?";
pub const ROOT_FOLDER_PROMPT: &str = "Select the media root folder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Uninitialized,
    Loading,
    EmptyAwaitingScan,
    Ready,
    /// The initial load hit a store failure. Terminal for this instance.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub root: PathBuf,
    pub folders_added: usize,
    pub files_added: usize,
    pub files_processed: usize,
    pub last_file_id: i64,
}

/// Owns the canonical catalog and orchestrates store, scanner and hierarchy.
///
/// Commands either complete fully or leave the in-memory catalog as it was:
/// memory is only touched after the store has committed.
pub struct CatalogCoordinator<S: CatalogStore> {
    store: S,
    config: AppConfig,
    root_folder: Option<PathBuf>,
    registry: ExtensionRegistry,
    catalog: Catalog,
    state: CatalogState,
    status: Box<dyn StatusSink>,
}

impl<S: CatalogStore> CatalogCoordinator<S> {
    pub fn new(store: S, config: AppConfig, status: Box<dyn StatusSink>) -> Self {
        let root_folder = config.root_folder.as_ref().map(PathBuf::from);
        Self {
            store,
            config,
            root_folder,
            registry: ExtensionRegistry::default(),
            catalog: Catalog::new(),
            state: CatalogState::Uninitialized,
            status,
        }
    }

    pub fn state(&self) -> CatalogState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ── Load ─────────────────────────────────────────────────────

    /// Loads mappings and rows from the store. When the store holds no
    /// catalog, asks `prompt` whether to scan the library root.
    pub fn load(&mut self, prompt: &dyn Prompt) -> Result<CatalogState> {
        if self.state == CatalogState::Error {
            return Err(Error::Terminal);
        }
        let first_load = self.state == CatalogState::Uninitialized;
        let previous = self.state;
        self.state = CatalogState::Loading;
        self.status.set_status("Loading media data from database...");

        let (registry, folders, files) = match self.read_store() {
            Ok(rows) => rows,
            Err(err) => {
                error!("Failed to load media data: {}", err);
                self.status.set_status("Error loading media data.");
                self.state = if first_load { CatalogState::Error } else { previous };
                return Err(err.into());
            }
        };
        self.registry = registry;

        if !folders.is_empty() || !files.is_empty() {
            let mut catalog = Catalog::new();
            catalog.add_records(folders, files, &self.registry);
            self.catalog = catalog;
            self.state = CatalogState::Ready;
            info!(
                "Loaded {} folders and {} media files",
                self.catalog.folders().len(),
                self.catalog.file_count()
            );
            self.status
                .set_status(&format!("Loaded {} media files.", self.catalog.file_count()));
            return Ok(self.state);
        }

        self.catalog = Catalog::new();
        self.state = CatalogState::EmptyAwaitingScan;
        if !prompt.confirm(SCAN_PROMPT) {
            self.status.set_status("No media data available.");
            return Ok(self.state);
        }

        if let Err(err) = self.scan_library_root(prompt) {
            if first_load && matches!(err, Error::Persistence(_)) {
                self.state = CatalogState::Error;
            }
            return Err(err);
        }
        self.status.set_status("Media scan completed.");
        Ok(self.state)
    }

    /// Scans the library root, asking for one when none is configured or
    /// stored. A chosen folder is stored before the scan starts.
    fn scan_library_root(&mut self, prompt: &dyn Prompt) -> Result<ScanSummary> {
        let root = match self.root_folder() {
            Ok(root) => root,
            Err(Error::NoRootFolder) => {
                let chosen = prompt
                    .choose_folder(ROOT_FOLDER_PROMPT)
                    .ok_or(Error::NoRootFolder)?;
                self.store
                    .set_parameter(ROOT_FOLDER_PARAMETER, &chosen.to_string_lossy())?;
                chosen
            }
            Err(err) => return Err(err),
        };
        let summary = self.scan_folder(&root)?;
        self.store
            .set_parameter(ROOT_FOLDER_PARAMETER, &summary.root.to_string_lossy())?;
        Ok(summary)
    }

    fn read_store(
        &self,
    ) -> std::result::Result<(ExtensionRegistry, Vec<FolderRecord>, Vec<FileRecord>), PersistenceError> {
        let registry = self.store.load_type_mappings()?;
        let folders = self.store.get_folders()?;
        let files = self.store.get_files()?;
        Ok((registry, folders, files))
    }

    // ── Scan ─────────────────────────────────────────────────────

    /// Library root: the configured folder, else the one stored in the catalog.
    pub fn root_folder(&self) -> Result<PathBuf> {
        if let Some(root) = &self.root_folder {
            return Ok(root.clone());
        }
        self.store
            .get_parameter(ROOT_FOLDER_PARAMETER)?
            .map(PathBuf::from)
            .ok_or(Error::NoRootFolder)
    }

    /// Scans `path` as an additional root. New ids start above the highest id
    /// this catalog ever issued, deleted folders included.
    pub fn scan_folder(&mut self, path: &Path) -> Result<ScanSummary> {
        self.ensure_loaded()?;
        let path = scanner::resolve_root(path)?;
        if let Some(existing) = self.catalog.overlapping_root(&path) {
            return Err(Error::AlreadyCatalogued(existing.folder_path.clone()));
        }

        let options = ScanOptions {
            ignore_patterns: self.config.ignore_patterns.clone(),
            progress_interval: self.config.progress_interval,
        };
        let min_folder_id = self.store.last_folder_id()?.max(self.catalog.max_folder_id());
        let output = scanner::scan(
            &path,
            self.registry.valid_extensions(),
            self.catalog.file_count() as i64,
            min_folder_id,
            &options,
            self.status.as_ref(),
        )
        .inspect_err(|err| {
            error!("Failed to scan media: {}", err);
            self.status.set_status("Error scanning media.");
        })?;

        self.apply_scan(path, output)
    }

    /// Persists a finished scan, then adds it to the catalog. A scan run on
    /// another thread is handed over here as a whole.
    pub fn apply_scan(&mut self, root: PathBuf, output: ScanOutput) -> Result<ScanSummary> {
        self.ensure_loaded()?;
        let summary = ScanSummary {
            root,
            folders_added: output.folders.len(),
            files_added: output.files.len(),
            files_processed: output.files_processed,
            last_file_id: output.last_file_id,
        };

        self.status.set_status(&format!(
            "Saving {} folders and {} files to database...",
            summary.folders_added, summary.files_added
        ));
        if let Err(err) = self.store.upsert(&output.folders, &output.files) {
            error!("Failed to save to database: {}", err);
            self.rollback_store();
            self.status.set_status("Error saving to database.");
            return Err(err.into());
        }

        self.catalog
            .add_records(output.folders, output.files, &self.registry);
        self.state = CatalogState::Ready;
        info!(
            "Added {} folders and {} media files from {}",
            summary.folders_added,
            summary.files_added,
            summary.root.display()
        );
        self.status
            .set_status(&format!("Saved {} files to database.", summary.files_added));
        Ok(summary)
    }

    /// Clears the catalog, records `path` as the library root and scans it.
    /// Asking the user for confirmation is the caller's job.
    pub fn change_root_folder(&mut self, path: &Path) -> Result<ScanSummary> {
        self.ensure_loaded()?;
        let path = scanner::resolve_root(path)?;

        if let Err(err) = self.store.clear_catalog() {
            error!("Failed to clear catalog: {}", err);
            self.rollback_store();
            return Err(err.into());
        }
        self.catalog.clear();
        self.state = CatalogState::EmptyAwaitingScan;

        self.store
            .set_parameter(ROOT_FOLDER_PARAMETER, &path.to_string_lossy())?;
        self.root_folder = Some(path.clone());
        self.status.set_status("Scanning new root folder...");
        let summary = self.scan_folder(&path)?;
        self.status.set_status("Ready.");
        Ok(summary)
    }

    // ── Delete ───────────────────────────────────────────────────

    /// Deletes a folder, all its descendants and their files. Returns the
    /// deleted folder ids.
    pub fn delete_folder(&mut self, folder_id: i64) -> Result<BTreeSet<i64>> {
        self.ensure_loaded()?;
        let ids = self.catalog.descendant_ids(folder_id);
        if ids.is_empty() {
            return Err(Error::FolderNotFound(folder_id));
        }

        if let Err(err) = self.store.delete_by_folder_ids(&ids) {
            error!("Failed to delete folder {}: {}", folder_id, err);
            self.rollback_store();
            self.status.set_status("Error deleting folder.");
            return Err(err.into());
        }

        self.catalog.remove_folders(&ids);
        self.state = CatalogState::Ready;
        info!("Deleted folder {} and {} descendants", folder_id, ids.len() - 1);
        self.status
            .set_status(&format!("Deleted {} folders.", ids.len()));
        Ok(ids)
    }

    fn rollback_store(&self) {
        if let Err(err) = self.store.rollback() {
            warn!("Rollback failed: {}", err);
        }
    }

    fn ensure_loaded(&self) -> Result<()> {
        match self.state {
            CatalogState::Error => Err(Error::Terminal),
            CatalogState::Uninitialized | CatalogState::Loading => Err(Error::NotLoaded),
            CatalogState::EmptyAwaitingScan | CatalogState::Ready => Ok(()),
        }
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn get_folder_by_id(&self, folder_id: i64) -> Option<&Folder> {
        self.catalog.get_folder_by_id(folder_id)
    }

    pub fn get_folder_by_path(&self, folder_path: &str) -> Option<&Folder> {
        self.catalog.get_folder_by_path(folder_path)
    }

    pub fn get_root_folders(&self) -> Vec<&Folder> {
        self.catalog.get_root_folders()
    }

    pub fn get_all_files(&self) -> &[MediaFile] {
        self.catalog.get_all_files()
    }

    pub fn get_files_by_extension(&self, extension: &str) -> Vec<&MediaFile> {
        self.catalog.get_files_by_extension(extension)
    }

    pub fn get_files_by_type(&self, media_type: &str) -> Vec<&MediaFile> {
        self.catalog.get_files_by_type(media_type)
    }

    pub fn outline(&self) -> Vec<OutlineRow> {
        self.catalog.outline()
    }

    // ── Collections ──────────────────────────────────────────────

    pub fn create_collection(&self, name: &str) -> Result<Collection> {
        self.ensure_loaded()?;
        Ok(self.store.create_collection(name)?)
    }

    pub fn delete_collection(&self, collection_id: i64) -> Result<()> {
        self.ensure_loaded()?;
        if !self.store.delete_collection(collection_id)? {
            return Err(Error::CollectionNotFound(collection_id));
        }
        Ok(())
    }

    pub fn add_to_collection(&self, collection_id: i64, folder_id: i64, file_name: &str) -> Result<()> {
        self.ensure_loaded()?;
        if self.catalog.get_file_by_name(folder_id, file_name).is_none() {
            return Err(Error::FileNotFound {
                folder_id,
                file_name: file_name.to_string(),
            });
        }
        if !self
            .store
            .get_collections()?
            .iter()
            .any(|c| c.collection_id == collection_id)
        {
            return Err(Error::CollectionNotFound(collection_id));
        }
        Ok(self
            .store
            .add_to_collection(collection_id, folder_id, file_name)?)
    }

    pub fn get_collections(&self) -> Result<Vec<Collection>> {
        self.ensure_loaded()?;
        Ok(self.store.get_collections()?)
    }

    /// Members that are still in the catalog, in the order they were added.
    pub fn get_collection_files(&self, collection_id: i64) -> Result<Vec<&MediaFile>> {
        self.ensure_loaded()?;
        let members = self.store.get_collection_members(collection_id)?;
        Ok(members
            .iter()
            .filter_map(|(folder_id, file_name)| self.catalog.get_file_by_name(*folder_id, file_name))
            .collect())
    }
}
