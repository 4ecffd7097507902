//! Durable token storage
//!
//! Values are kept obfuscated (base64) at rest. This is not encryption; it
//! only keeps tokens from being readable at a glance.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Token store errors
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("Token store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored value is not valid: {0}")]
    Encoding(String),

    #[error("Token store file is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

/// Key-value storage for session tokens
pub trait TokenStore: Send + Sync {
    /// Read a value; `Ok(None)` when absent
    fn load(&self, key: &str) -> Result<Option<String>, TokenStoreError>;

    /// Write a value, replacing any previous one
    fn store(&self, key: &str, value: &str) -> Result<(), TokenStoreError>;

    /// Delete a value; absent keys are not an error
    fn remove(&self, key: &str) -> Result<(), TokenStoreError>;
}

fn encode(value: &str) -> String {
    STANDARD.encode(value.as_bytes())
}

fn decode(encoded: &str) -> Result<String, TokenStoreError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| TokenStoreError::Encoding(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TokenStoreError::Encoding(e.to_string()))
}

/// In-process store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        self.values
            .lock()
            .get(key)
            .map(|encoded| decode(encoded))
            .transpose()
    }

    fn store(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        self.values.lock().insert(key.to_string(), encode(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), TokenStoreError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// JSON file store that survives restarts
///
/// The whole map is rewritten on each change via a temporary file and a
/// rename, so a crash never leaves a half-written file behind.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, TokenStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(serde_json::to_string_pretty(map)?.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        let _guard = self.lock.lock();
        self.read_map()?
            .get(key)
            .map(|encoded| decode(encoded))
            .transpose()
    }

    fn store(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        map.insert(key.to_string(), encode(value));
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), TokenStoreError> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}
