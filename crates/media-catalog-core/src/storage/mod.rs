pub mod models;
mod queries;
mod sqlite;

pub use models::{Collection, FileRecord, Folder, FolderRecord, MediaFile, MediaRef};
pub use sqlite::SqliteStore;

use crate::error::PersistenceError;
use crate::registry::ExtensionRegistry;
use std::collections::BTreeSet;

/// Name of the parameter holding the library root folder.
pub const ROOT_FOLDER_PARAMETER: &str = "rootfolder";

/// Highest folder id ever upserted. Survives deletes so ids are never reused.
pub const LAST_FOLDER_ID_PARAMETER: &str = "last_folder_id";

/// Persistence boundary consumed by the catalog coordinator.
///
/// Every mutating call is all-or-nothing: on `Err` nothing from that call is
/// committed. Retries, if any, belong to the implementation.
pub trait CatalogStore {
    /// Extension → media type mappings and the derived valid-extension set.
    fn load_type_mappings(&self) -> Result<ExtensionRegistry, PersistenceError>;

    fn get_folders(&self) -> Result<Vec<FolderRecord>, PersistenceError>;

    fn get_files(&self) -> Result<Vec<FileRecord>, PersistenceError>;

    /// Folders are keyed by `folder_id`, files by `(folder_id, file_name)`.
    /// Raises the `last_folder_id` parameter in the same transaction.
    fn upsert(&self, folders: &[FolderRecord], files: &[FileRecord]) -> Result<(), PersistenceError>;

    /// Deletes files, then folders, whose `folder_id` is in `ids`.
    fn delete_by_folder_ids(&self, ids: &BTreeSet<i64>) -> Result<(), PersistenceError>;

    /// Abandons any transaction left open by a failed call.
    fn rollback(&self) -> Result<(), PersistenceError>;

    fn get_parameter(&self, name: &str) -> Result<Option<String>, PersistenceError>;

    fn set_parameter(&self, name: &str, value: &str) -> Result<(), PersistenceError>;

    /// Highest folder id ever issued, 0 for a new catalog.
    fn last_folder_id(&self) -> Result<i64, PersistenceError> {
        Ok(self
            .get_parameter(LAST_FOLDER_ID_PARAMETER)?
            .and_then(|value| value.parse().ok())
            .unwrap_or(0))
    }

    /// Removes every folder and file row.
    fn clear_catalog(&self) -> Result<(), PersistenceError>;

    fn create_collection(&self, name: &str) -> Result<Collection, PersistenceError>;

    /// Returns false when no such collection existed.
    fn delete_collection(&self, collection_id: i64) -> Result<bool, PersistenceError>;

    fn add_to_collection(
        &self,
        collection_id: i64,
        folder_id: i64,
        file_name: &str,
    ) -> Result<(), PersistenceError>;

    fn get_collections(&self) -> Result<Vec<Collection>, PersistenceError>;

    /// Members as `(folder_id, file_name)` pairs, ordered by insertion.
    fn get_collection_members(&self, collection_id: i64) -> Result<Vec<(i64, String)>, PersistenceError>;
}
