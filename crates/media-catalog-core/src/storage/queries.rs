use super::models::*;
use super::sqlite::{op, SqliteStore};
use super::{CatalogStore, LAST_FOLDER_ID_PARAMETER};
use crate::error::PersistenceError;
use crate::registry::ExtensionRegistry;
use rusqlite::{params, params_from_iter, OptionalExtension};
use std::collections::BTreeSet;
use tracing::debug;

type Result<T> = std::result::Result<T, PersistenceError>;

/// Keeps `IN (...)` lists well under SQLite's bound-parameter limit.
const DELETE_BATCH_SIZE: usize = 500;

impl CatalogStore for SqliteStore {
    // ── Media Types ──────────────────────────────────────────────

    fn load_type_mappings(&self) -> Result<ExtensionRegistry> {
        let mut stmt = self
            .connection()
            .prepare("SELECT media_type_extension, media_type_description FROM media_types")
            .map_err(op("load media types"))?;
        let mappings = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(op("load media types"))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(op("load media types"))?;
        debug!("Loaded {} media type mappings", mappings.len());
        Ok(ExtensionRegistry::from_mappings(mappings))
    }

    // ── Folders & Files ──────────────────────────────────────────

    fn get_folders(&self) -> Result<Vec<FolderRecord>> {
        let mut stmt = self
            .connection()
            .prepare(
                "SELECT folder_id, folder_path, parent_folder_id \
                 FROM media_folders ORDER BY folder_path",
            )
            .map_err(op("read folders"))?;
        let folders = stmt
            .query_map([], |row| {
                Ok(FolderRecord {
                    folder_id: row.get(0)?,
                    folder_path: row.get(1)?,
                    parent_folder_id: row.get(2)?,
                })
            })
            .map_err(op("read folders"))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(op("read folders"))?;
        Ok(folders)
    }

    fn get_files(&self) -> Result<Vec<FileRecord>> {
        let mut stmt = self
            .connection()
            .prepare(
                "SELECT folder_id, file_name, file_extension, file_size_kb, folder_path \
                 FROM media_files ORDER BY folder_path, file_name",
            )
            .map_err(op("read files"))?;
        let files = stmt
            .query_map([], |row| {
                Ok(FileRecord {
                    folder_id: row.get(0)?,
                    file_name: row.get(1)?,
                    file_extension: row.get(2)?,
                    file_size_kb: row.get(3)?,
                    folder_path: row.get(4)?,
                })
            })
            .map_err(op("read files"))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(op("read files"))?;
        Ok(files)
    }

    fn upsert(&self, folders: &[FolderRecord], files: &[FileRecord]) -> Result<()> {
        let tx = self
            .connection()
            .unchecked_transaction()
            .map_err(op("upsert"))?;
        {
            let mut folder_stmt = tx
                .prepare_cached(
                    "INSERT INTO media_folders (folder_id, folder_path, parent_folder_id) \
                     VALUES (?1, ?2, ?3) \
                     ON CONFLICT(folder_id) DO UPDATE SET \
                         folder_path = excluded.folder_path, \
                         parent_folder_id = excluded.parent_folder_id",
                )
                .map_err(op("upsert folders"))?;
            for folder in folders {
                folder_stmt
                    .execute(params![folder.folder_id, folder.folder_path, folder.parent_folder_id])
                    .map_err(op("upsert folders"))?;
            }

            if let Some(max_id) = folders.iter().map(|f| f.folder_id).max() {
                tx.execute(
                    "INSERT INTO parameters (parameter_name, parameter_value) VALUES (?1, ?2) \
                     ON CONFLICT(parameter_name) DO UPDATE SET \
                         parameter_value = excluded.parameter_value \
                     WHERE CAST(excluded.parameter_value AS INTEGER) \
                         > CAST(parameters.parameter_value AS INTEGER)",
                    params![LAST_FOLDER_ID_PARAMETER, max_id.to_string()],
                )
                .map_err(op("upsert folders"))?;
            }

            let mut file_stmt = tx
                .prepare_cached(
                    "INSERT INTO media_files \
                     (folder_id, file_name, file_extension, file_size_kb, folder_path) \
                     VALUES (?1, ?2, ?3, ?4, ?5) \
                     ON CONFLICT(folder_id, file_name) DO UPDATE SET \
                         file_extension = excluded.file_extension, \
                         file_size_kb = excluded.file_size_kb, \
                         folder_path = excluded.folder_path",
                )
                .map_err(op("upsert files"))?;
            for file in files {
                file_stmt
                    .execute(params![
                        file.folder_id,
                        file.file_name,
                        file.file_extension,
                        file.file_size_kb,
                        file.folder_path,
                    ])
                    .map_err(op("upsert files"))?;
            }
        }
        tx.commit().map_err(op("upsert"))?;
        debug!("Upserted {} folders and {} files", folders.len(), files.len());
        Ok(())
    }

    fn delete_by_folder_ids(&self, ids: &BTreeSet<i64>) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = ids.iter().copied().collect();
        let tx = self
            .connection()
            .unchecked_transaction()
            .map_err(op("delete folders"))?;
        let mut files_deleted = 0;
        let mut folders_deleted = 0;
        for table in ["media_collection_files", "media_files", "media_folders"] {
            for chunk in ids.chunks(DELETE_BATCH_SIZE) {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                let sql = format!("DELETE FROM {} WHERE folder_id IN ({})", table, placeholders);
                let deleted = tx
                    .execute(&sql, params_from_iter(chunk.iter()))
                    .map_err(op("delete folders"))?;
                match table {
                    "media_files" => files_deleted += deleted,
                    "media_folders" => folders_deleted += deleted,
                    _ => {}
                }
            }
        }
        tx.commit().map_err(op("delete folders"))?;
        debug!("Deleted {} folders and {} files", folders_deleted, files_deleted);
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        if !self.connection().is_autocommit() {
            self.connection()
                .execute_batch("ROLLBACK")
                .map_err(op("rollback"))?;
            debug!("Rolled back open transaction");
        }
        Ok(())
    }

    // ── Parameters ───────────────────────────────────────────────

    fn get_parameter(&self, name: &str) -> Result<Option<String>> {
        let value: Option<Option<String>> = self
            .connection()
            .query_row(
                "SELECT parameter_value FROM parameters WHERE parameter_name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(op("read parameter"))?;
        Ok(value.flatten().filter(|v| !v.is_empty()))
    }

    fn set_parameter(&self, name: &str, value: &str) -> Result<()> {
        self.connection()
            .execute(
                "INSERT INTO parameters (parameter_name, parameter_value) VALUES (?1, ?2) \
                 ON CONFLICT(parameter_name) DO UPDATE SET parameter_value = excluded.parameter_value",
                params![name, value],
            )
            .map_err(op("write parameter"))?;
        Ok(())
    }

    fn clear_catalog(&self) -> Result<()> {
        self.truncate_all()
    }

    // ── Collections ──────────────────────────────────────────────

    fn create_collection(&self, name: &str) -> Result<Collection> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection()
            .execute(
                "INSERT INTO media_collections (collection_name, created_at) VALUES (?1, ?2)",
                params![name, now],
            )
            .map_err(op("create collection"))?;
        let collection_id = self.connection().last_insert_rowid();
        debug!("Created collection {} '{}'", collection_id, name);
        Ok(Collection {
            collection_id,
            collection_name: name.to_string(),
            created_at: now,
        })
    }

    fn delete_collection(&self, collection_id: i64) -> Result<bool> {
        let deleted = self
            .connection()
            .execute(
                "DELETE FROM media_collections WHERE collection_id = ?1",
                params![collection_id],
            )
            .map_err(op("delete collection"))?;
        Ok(deleted > 0)
    }

    fn add_to_collection(&self, collection_id: i64, folder_id: i64, file_name: &str) -> Result<()> {
        self.connection()
            .execute(
                "INSERT OR IGNORE INTO media_collection_files (collection_id, folder_id, file_name) \
                 VALUES (?1, ?2, ?3)",
                params![collection_id, folder_id, file_name],
            )
            .map_err(op("add to collection"))?;
        Ok(())
    }

    fn get_collections(&self) -> Result<Vec<Collection>> {
        let mut stmt = self
            .connection()
            .prepare(
                "SELECT collection_id, collection_name, created_at \
                 FROM media_collections ORDER BY collection_name",
            )
            .map_err(op("read collections"))?;
        let collections = stmt
            .query_map([], |row| {
                Ok(Collection {
                    collection_id: row.get(0)?,
                    collection_name: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })
            .map_err(op("read collections"))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(op("read collections"))?;
        Ok(collections)
    }

    fn get_collection_members(&self, collection_id: i64) -> Result<Vec<(i64, String)>> {
        let mut stmt = self
            .connection()
            .prepare(
                "SELECT folder_id, file_name FROM media_collection_files \
                 WHERE collection_id = ?1 ORDER BY rowid",
            )
            .map_err(op("read collection members"))?;
        let members = stmt
            .query_map(params![collection_id], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(op("read collection members"))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(op("read collection members"))?;
        Ok(members)
    }
}
