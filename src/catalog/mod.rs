mod fs_store;

pub use fs_store::FsCatalogStore;

use crate::store::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One entry in the clothing catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Location of the stored garment image blob
    pub image_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Clothing catalog boundary (listing plus admin CRUD).
pub trait CatalogStore {
    /// All catalog items, unordered. An empty catalog is a valid state.
    fn list(&self) -> Result<Vec<ClothingItem>, StorageError>;

    /// Look up a single item by id.
    fn get(&self, id: &str) -> Result<ClothingItem, StorageError>;

    /// Store the garment image blob and create a catalog record for it.
    fn create(
        &self,
        name: &str,
        category: &str,
        image_bytes: &[u8],
    ) -> Result<ClothingItem, StorageError>;

    /// Delete the catalog record, then best-effort delete its stored image.
    /// A failed image deletion never fails the record deletion.
    fn delete(&self, id: &str) -> Result<(), StorageError>;
}
