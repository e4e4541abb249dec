use super::{HistoryRecord, HistoryStore, PhotoStore, StorageError};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Filesystem-backed photo and history storage
///
/// Layout under the root:
/// - `users/<user>/photo.png`
/// - `users/<user>/looks/<id>.png`
/// - `users/<user>/history/<id>.json`
pub struct FsStore {
    root: PathBuf,
    seq: AtomicU64,
}

impl FsStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            seq: AtomicU64::new(0),
        }
    }

    fn user_dir(&self, user_id: &str) -> PathBuf {
        self.root.join("users").join(user_id)
    }

    /// Millisecond timestamp plus a process-local sequence number, so
    /// back-to-back saves still get distinct ids.
    fn next_id(&self) -> String {
        format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            self.seq.fetch_add(1, Ordering::Relaxed)
        )
    }
}

impl PhotoStore for FsStore {
    fn store_user_photo(
        &self,
        user_id: &str,
        image_bytes: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let dir = self.user_dir(user_id);
        fs::create_dir_all(&dir)?;

        let path = dir.join("photo.png");
        fs::write(&path, image_bytes)?;
        tracing::debug!(user = user_id, "stored user photo");
        Ok(path)
    }

    fn get_user_photo(&self, user_id: &str) -> Result<PathBuf, StorageError> {
        let path = self.user_dir(user_id).join("photo.png");
        if path.exists() {
            Ok(path)
        } else {
            Err(StorageError::NotFound(format!(
                "no stored photo for user {user_id}"
            )))
        }
    }
}

impl HistoryStore for FsStore {
    fn record_try_on(
        &self,
        user_id: &str,
        clothing_item_id: &str,
        combined_png: &[u8],
    ) -> Result<HistoryRecord, StorageError> {
        let id = self.next_id();
        let looks_dir = self.user_dir(user_id).join("looks");
        let history_dir = self.user_dir(user_id).join("history");
        fs::create_dir_all(&looks_dir)?;
        fs::create_dir_all(&history_dir)?;

        let image_path = looks_dir.join(format!("{id}.png"));
        fs::write(&image_path, combined_png)?;

        let record = HistoryRecord {
            id: id.clone(),
            user_id: user_id.to_string(),
            clothing_item_id: clothing_item_id.to_string(),
            image_path,
            created_at: Utc::now(),
        };
        fs::write(
            history_dir.join(format!("{id}.json")),
            serde_json::to_string_pretty(&record)?,
        )?;

        tracing::debug!(user = user_id, look = %record.id, "recorded try-on");
        Ok(record)
    }

    fn list_try_on_history(&self, user_id: &str) -> Result<Vec<HistoryRecord>, StorageError> {
        let dir = self.user_dir(user_id).join("history");
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            records.push(serde_json::from_str::<HistoryRecord>(&content)?);
        }

        // Newest first; the sequence suffix breaks same-instant ties
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }
}
