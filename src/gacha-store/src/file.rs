//! JSON file store.
//!
//! The whole store is one JSON object of string keys and values. Each write
//! rewrites a sibling temp file and renames it over the original, so a
//! crash mid-write leaves the previous contents intact.

use gacha::{KeyValueStore, StoreError, StoreResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

type Entries = BTreeMap<String, String>;

/// Key-value store persisted as a single JSON object
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`. The file is created on first write.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StoreResult<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Entries::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    fn write_entries(&self, entries: &Entries) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Read-modify-write under the lock. A file that no longer parses is
    /// replaced by the next write instead of blocking it.
    fn update(&self, apply: impl FnOnce(&mut Entries) -> bool) -> StoreResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut entries, recovered) = match self.read_entries() {
            Ok(entries) => (entries, false),
            Err(StoreError::Json(e)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "store file is not valid JSON, replacing it: {}",
                    e
                );
                (Entries::new(), true)
            }
            Err(e) => return Err(e),
        };
        if apply(&mut entries) || recovered {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.update(|entries| entries.remove(key).is_some())
    }
}
