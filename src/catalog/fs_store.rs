use super::{CatalogStore, ClothingItem};
use crate::store::StorageError;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Filesystem-backed clothing catalog
///
/// Layout under the root: `catalog.json` holds the record index, with one
/// image blob per item under `garments/`.
pub struct FsCatalogStore {
    root: PathBuf,
    seq: AtomicU64,
}

impl FsCatalogStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            seq: AtomicU64::new(0),
        }
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("catalog.json")
    }

    fn load_index(&self) -> Result<Vec<ClothingItem>, StorageError> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_index(&self, items: &[ClothingItem]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.index_path(), serde_json::to_string_pretty(items)?)?;
        Ok(())
    }
}

impl CatalogStore for FsCatalogStore {
    fn list(&self) -> Result<Vec<ClothingItem>, StorageError> {
        self.load_index()
    }

    fn get(&self, id: &str) -> Result<ClothingItem, StorageError> {
        self.load_index()?
            .into_iter()
            .find(|item| item.id == id)
            .ok_or_else(|| StorageError::NotFound(format!("clothing item {id}")))
    }

    fn create(
        &self,
        name: &str,
        category: &str,
        image_bytes: &[u8],
    ) -> Result<ClothingItem, StorageError> {
        let id = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            self.seq.fetch_add(1, Ordering::Relaxed)
        );

        // Blob first, record second
        let garments_dir = self.root.join("garments");
        fs::create_dir_all(&garments_dir)?;
        let image_path = garments_dir.join(format!("{id}.png"));
        fs::write(&image_path, image_bytes)?;

        let item = ClothingItem {
            id,
            name: name.to_string(),
            category: category.to_string(),
            image_path,
            created_at: Utc::now(),
        };

        let mut items = self.load_index()?;
        items.push(item.clone());
        self.save_index(&items)?;

        tracing::info!(item = %item.id, "catalog item created");
        Ok(item)
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        let mut items = self.load_index()?;
        let Some(pos) = items.iter().position(|item| item.id == id) else {
            return Err(StorageError::NotFound(format!("clothing item {id}")));
        };
        let removed = items.remove(pos);
        self.save_index(&items)?;

        // Image deletion is best-effort; the record removal stands either way
        if let Err(e) = fs::remove_file(&removed.image_path) {
            tracing::warn!(
                "failed to delete garment image {}: {e}",
                removed.image_path.display()
            );
        }

        tracing::info!(item = id, "catalog item deleted");
        Ok(())
    }
}
