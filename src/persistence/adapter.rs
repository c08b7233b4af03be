//! Model save/load on top of a [`Storage`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::Model;

use super::storage::Storage;
use super::PersistenceError;

/// Format version written into every stored model.
pub const STORAGE_VERSION: u32 = 1;

#[derive(Serialize)]
struct StoredModelRef<'a> {
    version: u32,
    model: &'a Model,
}

#[derive(Deserialize)]
struct StoredModel {
    version: u32,
    model: Model,
}

/// Saves and restores Model snapshots by key.
///
/// Errors embedded in the Model are stored as plain `{name, message, stack?}`
/// records and rebuilt on load.
#[derive(Clone)]
pub struct PersistenceAdapter {
    storage: Arc<dyn Storage>,
}

impl PersistenceAdapter {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn save(&self, key: &str, model: &Model) -> Result<(), PersistenceError> {
        let stored = StoredModelRef {
            version: STORAGE_VERSION,
            model,
        };
        let json = serde_json::to_string(&stored).map_err(|source| PersistenceError::Json {
            key: key.to_string(),
            source,
        })?;
        self.storage.set(key, &json)?;
        info!(key, storage = self.storage.name(), "Saved model");
        Ok(())
    }

    /// Returns `None` when nothing is stored under `key`.
    pub fn load(&self, key: &str) -> Result<Option<Model>, PersistenceError> {
        let Some(json) = self.storage.get(key)? else {
            debug!(key, "No stored model");
            return Ok(None);
        };
        let stored: StoredModel =
            serde_json::from_str(&json).map_err(|source| PersistenceError::Json {
                key: key.to_string(),
                source,
            })?;
        if stored.version != STORAGE_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                key: key.to_string(),
                version: stored.version,
            });
        }
        Ok(Some(stored.model))
    }

    /// Returns true if a model was stored under `key`.
    pub fn remove(&self, key: &str) -> Result<bool, PersistenceError> {
        self.storage.remove(key)
    }

    pub fn exists(&self, key: &str) -> Result<bool, PersistenceError> {
        self.storage.contains(key)
    }
}
