use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::prelude::{CoreError, CoreResult};

/// Keyed storage for whole-record JSON documents.
pub trait StateBackend: Send + Sync {
    /// Returns `None` when nothing has been stored under `key` yet.
    fn read(&self, key: &str) -> CoreResult<Option<String>>;
    fn write(&self, key: &str, contents: &str) -> CoreResult<()>;
}

/// Stores each key as `<root>/<key>.json`.
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl StateBackend for FileBackend {
    fn read(&self, key: &str) -> CoreResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, key: &str, contents: &str) -> CoreResult<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        // staged write, then rename over the live record
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, contents)?;
        if let Err(err) = fs::rename(&staging, &path) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        Ok(())
    }
}

/// Process-local backend for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(key: &str, contents: &str) -> Self {
        let backend = Self::new();
        if let Ok(mut records) = backend.records.lock() {
            records.insert(key.to_string(), contents.to_string());
        }
        backend
    }

    pub fn record(&self, key: &str) -> Option<String> {
        self.records
            .lock()
            .ok()
            .and_then(|records| records.get(key).cloned())
    }
}

impl StateBackend for MemoryBackend {
    fn read(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.record(key))
    }

    fn write(&self, key: &str, contents: &str) -> CoreResult<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| CoreError::Storage("memory backend lock poisoned".into()))?;
        records.insert(key.to_string(), contents.to_string());
        Ok(())
    }
}

/// Reads and decodes a JSON record. Undecodable contents map to [`CoreError::CorruptState`].
pub fn load_json<T: DeserializeOwned>(backend: &dyn StateBackend, key: &str) -> CoreResult<Option<T>> {
    let Some(contents) = backend.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|err| CoreError::CorruptState {
            key: key.to_string(),
            reason: err.to_string(),
        })
}

pub fn store_json<T: Serialize>(backend: &dyn StateBackend, key: &str, value: &T) -> CoreResult<()> {
    let contents = serde_json::to_string(value).map_err(|err| CoreError::Storage(err.to_string()))?;
    backend.write(key, &contents)
}
