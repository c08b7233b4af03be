//! Key-value storage backends.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::PersistenceError;

/// Synchronous string key-value store.
pub trait Storage: Send + Sync {
    /// Human-readable backend name for logging.
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Returns true if the key existed.
    fn remove(&self, key: &str) -> Result<bool, PersistenceError>;

    fn contains(&self, key: &str) -> Result<bool, PersistenceError>;
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, PersistenceError> {
        Ok(self.entries.write().remove(key).is_some())
    }

    fn contains(&self, key: &str) -> Result<bool, PersistenceError> {
        Ok(self.entries.read().contains_key(key))
    }
}

/// One `{key}.json` file per key under a directory.
///
/// Writes go to `{key}.json.tmp` first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(PersistenceError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl Storage for FileStorage {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let tmp_path = path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path).map_err(io_error(&tmp_path))?;
            let mut writer = BufWriter::new(file);
            writer
                .write_all(value.as_bytes())
                .map_err(io_error(&tmp_path))?;
            writer.flush().map_err(io_error(&tmp_path))?;
            writer.get_ref().sync_all().map_err(io_error(&tmp_path))?;
        }
        fs::rename(&tmp_path, &path).map_err(io_error(&path))?;

        tracing::debug!(path = %path.display(), bytes = value.len(), "Stored entry");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, PersistenceError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn contains(&self, key: &str) -> Result<bool, PersistenceError> {
        Ok(self.path_for(key)?.is_file())
    }
}
