mod manager;
mod store;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::SceneError;

pub use manager::{CATALOG_KEY, DEFAULT_PREVIEW_SCALE, PersistenceManager};
pub use store::{DEFAULT_QUOTA_BYTES, FileStore, KeyValueStore, MemoryStore};

/// Errors that can occur during drawing persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Drawing not found: {0}")]
    NotFound(String),

    #[error("Import file is not a valid drawing: {0}")]
    ImportFormat(String),

    #[error("Storage quota exceeded writing '{key}': {required} bytes needed, {available} available")]
    StorageQuota {
        key: String,
        required: usize,
        available: usize,
    },

    #[error("Drawing catalog is unreadable: {0}")]
    CorruptCatalog(String),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Failed to serialize drawing data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Full record of a saved drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDrawing {
    pub id: String,
    pub name: String,
    /// Low-resolution PNG snapshot
    pub preview: Vec<u8>,
    pub serialized_scene: String,
    /// Unix milliseconds
    pub last_modified: u64,
}

/// Catalog entry; lists a drawing without deserializing its scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingSummary {
    pub id: String,
    pub name: String,
    pub preview: Vec<u8>,
    pub last_modified: u64,
}

impl From<&SavedDrawing> for DrawingSummary {
    fn from(record: &SavedDrawing) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            preview: record.preview.clone(),
            last_modified: record.last_modified,
        }
    }
}
