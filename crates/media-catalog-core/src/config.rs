use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::collections::BTreeMap;

pub const DEFAULT_DATABASE_PATH: &str = "media_catalog.db";
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite catalog file.
    pub database_path: String,
    /// Library root to scan. Falls back to the `rootfolder` parameter in the store.
    pub root_folder: Option<String>,
    /// Glob patterns for directories and files the scanner skips.
    pub ignore_patterns: Vec<String>,
    /// Files processed between two scan status updates.
    pub progress_interval: usize,
    /// Extension → media type label, used to seed an empty `media_types` table.
    /// Keys may omit the leading dot.
    pub media_types: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            root_folder: None,
            ignore_patterns: Vec::new(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            media_types: BTreeMap::new(),
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    load_configuration_from("Config")
}

/// Reads the optional config file `name` (any format the `config` crate
/// recognises by extension), then `MEDIA_CATALOG_*` environment overrides.
pub fn load_configuration_from(name: &str) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(name).required(false))
        .add_source(
            Environment::with_prefix("MEDIA_CATALOG")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;
    let mut config = builder.try_deserialize::<AppConfig>()?;
    if config.progress_interval == 0 {
        config.progress_interval = DEFAULT_PROGRESS_INTERVAL;
    }
    Ok(config)
}
