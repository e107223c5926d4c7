//! Durable storage backends for state snapshots
//!
//! Snapshots are opaque strings keyed by a single application identifier.
//! Serialization happens in the [`StateSynchronizer`](crate::StateSynchronizer);
//! backends only move bytes.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors raised by storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed
    #[error("storage I/O failed for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The snapshot could not be encoded or decoded
    #[error("snapshot for key {key:?} is malformed: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Key/value snapshot storage.
///
/// Implementations take `&self`; the application is single-threaded and
/// backends use interior mutability where they need it.
pub trait Storage {
    /// Read the snapshot stored under `key`, if any
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the snapshot stored under `key`
    fn save(&self, key: &str, snapshot: &str) -> Result<(), StorageError>;
}

impl<T: Storage + ?Sized> Storage for std::rc::Rc<T> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, snapshot: &str) -> Result<(), StorageError> {
        (**self).save(key, snapshot)
    }
}

impl<T: Storage + ?Sized> Storage for Box<T> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, snapshot: &str) -> Result<(), StorageError> {
        (**self).save(key, snapshot)
    }
}

/// Stores each key as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Use `dir` for snapshot files. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use `<platform data dir>/<app_name>`.
    ///
    /// Returns `None` when the platform has no data directory.
    #[cfg(feature = "data-dir")]
    pub fn in_data_dir(app_name: &str) -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join(app_name)))
    }

    /// Directory holding the snapshot files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for JsonFileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn save(&self, key: &str, snapshot: &str) -> Result<(), StorageError> {
        let io_err = |source: io::Error| StorageError::Io {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, snapshot).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)
    }
}

/// In-memory storage, used for tests and ephemeral sessions.
///
/// Counts successful writes and can be told to fail reads or writes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
    fail_loads: Cell<bool>,
    fail_saves: Cell<bool>,
}

impl MemoryStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-seeded with `snapshot` under `key`
    pub fn with_entry(key: &str, snapshot: &str) -> Self {
        let storage = Self::new();
        storage
            .entries
            .borrow_mut()
            .insert(key.to_string(), snapshot.to_string());
        storage
    }

    /// Raw snapshot stored under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Number of successful saves
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Make subsequent loads fail
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.set(fail);
    }

    /// Make subsequent saves fail
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_loads.get() {
            return Err(StorageError::Unavailable(format!("load of {key:?} refused")));
        }
        Ok(self.get(key))
    }

    fn save(&self, key: &str, snapshot: &str) -> Result<(), StorageError> {
        if self.fail_saves.get() {
            return Err(StorageError::Unavailable(format!("save of {key:?} refused")));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), snapshot.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
