//! Model snapshot persistence over a key-value store.

mod adapter;
mod storage;

use std::path::PathBuf;

use thiserror::Error;

pub use adapter::{PersistenceAdapter, STORAGE_VERSION};
pub use storage::{FileStorage, MemoryStorage, Storage};

/// Errors raised while storing or restoring a Model.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage I/O failed for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage key '{key}'")]
    InvalidKey { key: String },

    #[error("Failed to encode or decode stored model '{key}': {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Stored model '{key}' has unsupported version {version}")]
    UnsupportedVersion { key: String, version: u32 },
}
