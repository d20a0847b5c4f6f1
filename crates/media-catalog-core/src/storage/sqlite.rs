use crate::error::PersistenceError;
use crate::registry::{normalize_extension, DEFAULT_MEDIA_TYPES};
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::debug;

const SCHEMA_VERSION: i64 = 1;

type Result<T> = std::result::Result<T, PersistenceError>;

pub(crate) fn op(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> PersistenceError {
    move |source| PersistenceError::new(operation, source)
}

/// SQLite-backed catalog store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(op("open"))?;
        let store = SqliteStore { conn };
        store.configure_pragmas()?;
        store.migrate_schema()?;
        debug!("Catalog store opened at {}", path.as_ref().display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(op("open"))?;
        let store = SqliteStore { conn };
        store.configure_pragmas()?;
        store.migrate_schema()?;
        Ok(store)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA cache_size = -16000;
                 PRAGMA busy_timeout = 5000;",
            )
            .map_err(op("configure pragmas"))?;
        debug!("SQLite pragmas configured (WAL mode, 16MB cache)");
        Ok(())
    }

    /// Creates the schema if needed. Databases written by a newer schema
    /// version are left alone.
    fn migrate_schema(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(op("read schema version"))?;

        if version > SCHEMA_VERSION {
            debug!("Schema version {} is newer than {}, not migrating", version, SCHEMA_VERSION);
            return Ok(());
        }

        self.conn
            .execute_batch(include_str!("schema.sql"))
            .map_err(op("create schema"))?;
        debug!("SQLite schema initialized (version {})", SCHEMA_VERSION);
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Fills an empty `media_types` table, from `mappings` or, when that is
    /// empty, from the built-in defaults. Returns the number of rows written.
    pub fn seed_media_types<'a, I>(&self, mappings: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let existing: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM media_types", [], |row| row.get(0))
            .map_err(op("count media types"))?;
        if existing > 0 {
            return Ok(0);
        }

        let mut mappings: Vec<(&str, &str)> = mappings.into_iter().collect();
        if mappings.is_empty() {
            mappings = DEFAULT_MEDIA_TYPES.to_vec();
        }
        let written = self.upsert_media_types(&mappings)?;
        debug!("Seeded {} media types", written);
        Ok(written)
    }

    pub fn upsert_media_types(&self, mappings: &[(&str, &str)]) -> Result<usize> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(op("upsert media types"))?;
        let mut count = 0;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO media_types (media_type_extension, media_type_description) \
                     VALUES (?1, ?2) \
                     ON CONFLICT(media_type_extension) DO UPDATE SET \
                         media_type_description = excluded.media_type_description",
                )
                .map_err(op("upsert media types"))?;
            for (extension, label) in mappings {
                count += stmt
                    .execute(params![normalize_extension(extension), label])
                    .map_err(op("upsert media types"))?;
            }
        }
        tx.commit().map_err(op("upsert media types"))?;
        Ok(count)
    }

    /// Deletes every folder, file and collection membership row. Media types,
    /// parameters and collections themselves are kept.
    pub fn truncate_all(&self) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(op("truncate"))?;
        tx.execute_batch(
            "DELETE FROM media_collection_files;
             DELETE FROM media_files;
             DELETE FROM media_folders;",
        )
        .map_err(op("truncate"))?;
        tx.commit().map_err(op("truncate"))?;
        debug!("Catalog tables truncated");
        Ok(())
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.conn.path())
            .finish()
    }
}
