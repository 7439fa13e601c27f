// src/status/store.rs
// =============================================================================
// Local key-value storage for the cache envelope.
//
// The status cache only ever uses one key, but the store is a plain string
// key-value interface so the same cache code runs against:
// - FileStore: one file per key under a directory (used by the CLI)
// - MemoryStore: a HashMap behind a Mutex (tests, embedders without a disk)
//
// Store errors are reported as StatusError::CacheRead / CacheWrite; the cache
// logs them and carries on.
// =============================================================================

use crate::error::StatusError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// A tiny localStorage-like interface
//
// get: Ok(None) when the key was never written; Err only for real I/O trouble
// set: replaces the whole value for the key
//
// Send + Sync because the StatusCache that owns the store may be shared
// between tasks.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StatusError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StatusError>;
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // Maps a key to its file inside the store directory
    //
    // Parameters:
    //   key: the store key, e.g. "statusTagsData"
    //
    // Returns: <dir>/<sanitized key>.json
    //
    // Anything outside [A-Za-z0-9_-] becomes '_', so a key can never escape
    // the directory.
    //
    // Example:
    //   "statusTagsData" -> <dir>/statusTagsData.json
    //   "../escape"      -> <dir>/___escape.json
    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl KeyValueStore for FileStore {
    // A missing file is simply an empty slot, not an error
    fn get(&self, key: &str) -> Result<Option<String>, StatusError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StatusError::CacheRead(e.to_string())),
        }
    }

    // Creates the directory on first write, then replaces the file
    fn set(&self, key: &str, value: &str) -> Result<(), StatusError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StatusError::CacheWrite(e.to_string()))?;

        // Write to a sibling file and rename, so a reader never sees half an envelope
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| StatusError::CacheWrite(e.to_string()))?;
        std::fs::rename(&tmp, &path).map_err(|e| StatusError::CacheWrite(e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StatusError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StatusError::CacheRead(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StatusError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StatusError::CacheWrite(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
