pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod hierarchy;
pub mod progress;
pub mod registry;
pub mod scanner;
pub mod storage;

pub use catalog::{Catalog, OutlineRow};
pub use config::AppConfig;
pub use coordinator::{CatalogCoordinator, CatalogState, ScanSummary};
pub use error::Error;
pub use progress::{Prompt, SilentSink, StatusSink};
pub use registry::ExtensionRegistry;
pub use storage::{CatalogStore, SqliteStore};
