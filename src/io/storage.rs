use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tempfile::NamedTempFile;

use crate::io::lock::{FileLock, LockError};
use crate::model::classification::Preferences;
use crate::ops::store::{PreferenceSink, StoreError};

/// Error type for the key/value storage file
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("{0}")]
    Lock(#[from] LockError),
    #[error("could not encode storage entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Write `content` to `path` through a temp file in the same directory, so
/// readers never observe a partial file.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// A JSON object of string keys to string values, stored in one file.
///
/// Plays the part a browser's local storage would: each value is an opaque
/// string, and callers encode their own payloads.
#[derive(Debug, Clone)]
pub struct KeyValueFile {
    path: PathBuf,
}

impl KeyValueFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        KeyValueFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// All entries. A missing file is empty; a file that is not a JSON
    /// object of strings is logged and treated as empty.
    pub fn entries(&self) -> Result<IndexMap<String, String>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(IndexMap::new()),
            Err(e) => {
                return Err(StorageError::ReadError {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        match serde_json::from_str(&text) {
            Ok(map) => Ok(map),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring malformed storage file");
                Ok(IndexMap::new())
            }
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.shift_remove(key))
    }

    /// Set one entry, leaving the others in place. The read-modify-write is
    /// done under the directory lock.
    pub fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.update(|map| {
            map.insert(key.to_string(), value);
        })
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|map| {
            map.shift_remove(key);
        })
    }

    fn update(&self, f: impl FnOnce(&mut IndexMap<String, String>)) -> Result<(), StorageError> {
        let dir = self.dir();
        fs::create_dir_all(&dir).map_err(|e| StorageError::WriteError {
            path: dir.clone(),
            source: e,
        })?;
        let _lock = FileLock::acquire_default(&dir)?;
        let mut map = self.entries()?;
        f(&mut map);
        let content = serde_json::to_string_pretty(&map)?;
        atomic_write(&self.path, content.as_bytes()).map_err(|e| StorageError::WriteError {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Read the saved preferences under `key`.
///
/// Anything short of a readable, well-formed entry yields empty preferences;
/// problems are logged, never raised.
pub fn load_preferences(file: &KeyValueFile, key: &str) -> Preferences {
    let raw = match file.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Preferences::default(),
        Err(e) => {
            tracing::warn!(error = %e, "could not read saved preferences");
            return Preferences::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(prefs) => prefs,
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed saved preferences");
            Preferences::default()
        }
    }
}

pub fn save_preferences(file: &KeyValueFile, key: &str, prefs: &Preferences) -> Result<(), StorageError> {
    file.set(key, serde_json::to_string(prefs)?)
}

/// Persists every store mutation to a [`KeyValueFile`] entry.
#[derive(Debug, Clone)]
pub struct FileSink {
    file: KeyValueFile,
    key: String,
}

impl FileSink {
    pub fn new(file: KeyValueFile, key: impl Into<String>) -> Self {
        FileSink {
            file,
            key: key.into(),
        }
    }
}

impl PreferenceSink for FileSink {
    fn persist(&mut self, prefs: &Preferences) -> Result<(), StoreError> {
        tracing::debug!(path = %self.file.path().display(), "saving preferences");
        save_preferences(&self.file, &self.key, prefs).map_err(|e| StoreError::Persist(e.to_string()))
    }
}
