//! Runtime configuration, built from the command line

use std::path::PathBuf;

use marquee::{JsonFileStorage, MemoryStorage, Storage, StorageError};

use crate::catalog::CatalogConfig;
use crate::context::DEFAULT_STORAGE_KEY;

/// Where snapshots are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// Platform data directory (`<data_dir>/movie-browser`)
    DataDir,
    /// Explicit directory
    Dir(PathBuf),
    /// In memory only; nothing survives the process
    Ephemeral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Shown on the support screen
    pub app_name: String,
    pub storage_key: String,
    pub storage: StorageLocation,
    pub catalog: CatalogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Movie Browser".to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage: StorageLocation::DataDir,
            catalog: CatalogConfig::default(),
        }
    }
}

impl Config {
    /// Open the configured storage backend
    pub fn open_storage(&self) -> Result<Box<dyn Storage>, StorageError> {
        let storage: Box<dyn Storage> = match &self.storage {
            StorageLocation::DataDir => Box::new(
                JsonFileStorage::in_data_dir(DEFAULT_STORAGE_KEY).ok_or_else(|| {
                    StorageError::Unavailable("no platform data directory".to_string())
                })?,
            ),
            StorageLocation::Dir(dir) => Box::new(JsonFileStorage::new(dir.clone())),
            StorageLocation::Ephemeral => Box::new(MemoryStorage::new()),
        };
        Ok(storage)
    }
}
