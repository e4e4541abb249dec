mod fs;

pub use fs::FsStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the storage boundary (photos, history, catalog records).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

/// One saved look: a composite image tied to the clothing item it was
/// produced from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub user_id: String,
    pub clothing_item_id: String,
    pub image_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// User photo storage boundary.
pub trait PhotoStore {
    /// Store a user's photo, replacing any previous one. Returns the stored
    /// location.
    fn store_user_photo(&self, user_id: &str, image_bytes: &[u8])
        -> Result<PathBuf, StorageError>;

    /// Location of the user's stored photo, or `NotFound`.
    fn get_user_photo(&self, user_id: &str) -> Result<PathBuf, StorageError>;
}

/// Try-on history boundary.
pub trait HistoryStore {
    /// Persist a finished composite (lossless PNG bytes) as a history record.
    fn record_try_on(
        &self,
        user_id: &str,
        clothing_item_id: &str,
        combined_png: &[u8],
    ) -> Result<HistoryRecord, StorageError>;

    /// All of a user's looks, newest first.
    fn list_try_on_history(&self, user_id: &str) -> Result<Vec<HistoryRecord>, StorageError>;
}
