//! Key-value persistence seam.
//!
//! The account store is handed an explicit storage handle rather than
//! reaching for a module-level singleton, so tests can swap in the
//! in-memory double.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::errors::{IdentityError, IdentityResult};

/// Minimal string key-value storage used by the account record store.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> IdentityResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> IdentityResult<()>;
    fn delete(&self, key: &str) -> IdentityResult<()>;
}

/// File-per-key store rooted at a directory. Writes go through a
/// temporary file plus rename so a crash mid-write never leaves a
/// half-written entry behind.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    root_dir: PathBuf,
}

impl FileKvStore {
    pub fn new(root: impl AsRef<Path>) -> IdentityResult<Self> {
        let root_dir = root.as_ref().to_path_buf();
        if root_dir.as_os_str().is_empty() {
            return Err(IdentityError::StorageError(
                "Store root directory cannot be empty".to_string(),
            ));
        }
        fs::create_dir_all(&root_dir)?;
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn entry_path(&self, key: &str) -> IdentityResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(IdentityError::StorageError(format!(
                "Invalid store key: {}",
                key
            )));
        }
        Ok(self.root_dir.join(format!("{}.json", key)))
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> IdentityResult<Option<String>> {
        let path = self.entry_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn put(&self, key: &str, value: &str) -> IdentityResult<()> {
        let path = self.entry_path(key)?;
        let tmp_path = path.with_extension("new");
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(tmp_path, &path)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> IdentityResult<()> {
        let path = self.entry_path(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> IdentityResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> IdentityResult<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> IdentityResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
