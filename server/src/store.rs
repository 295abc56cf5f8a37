use crate::{error::StoreError, models::ShortenerRecord};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Ordered list of shorteners mirrored to a single JSON file.
///
/// Every mutation takes the write lock and holds it while the new list is
/// written to disk, so concurrent writers are serialised and the file always
/// matches the in-memory list. Changes are applied to a copy that only
/// replaces the live list once the write succeeded; a failed write leaves
/// both the list and the file untouched.
pub struct Store {
    path: PathBuf,
    records: RwLock<Vec<ShortenerRecord>>,
}

impl Store {
    /// Read the store file at startup.
    ///
    /// A missing file is created empty, and an empty (or whitespace-only)
    /// file yields an empty store. Anything that is not a JSON array of
    /// records is an error.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let raw = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tokio::fs::write(&path, b"")
                    .await
                    .map_err(|source| StoreError::Write {
                        path: path.clone(),
                        source,
                    })?;
                tracing::info!("Created empty store file {}", path.display());
                Vec::new()
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        let records = if raw.iter().all(u8::is_ascii_whitespace) {
            Vec::new()
        } else {
            let parsed: Vec<ShortenerRecord> =
                serde_json::from_slice(&raw).map_err(|source| StoreError::Malformed {
                    path: path.clone(),
                    source,
                })?;
            dedup_keys(parsed)
        };

        tracing::info!(
            "Loaded {} shortener(s) from {}",
            records.len(),
            path.display()
        );

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Position of the record with this key, if any.
    pub async fn find_index(&self, key: &str) -> Option<usize> {
        find_index(&self.records.read().await, key)
    }

    pub async fn find(&self, key: &str) -> Option<ShortenerRecord> {
        let records = self.records.read().await;
        find_index(&records, key).map(|i| records[i].clone())
    }

    /// Snapshot of every record in store order.
    #[cfg(test)]
    pub async fn records(&self) -> Vec<ShortenerRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Point `key` at `destination`, appending a new record if the key is new.
    pub async fn upsert(&self, key: &str, destination: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;

        let mut next = records.clone();
        match find_index(&next, key) {
            Some(i) => next[i].destination = destination.to_owned(),
            None => next.push(ShortenerRecord::new(key, destination)),
        }

        self.persist(&next).await?;
        *records = next;

        tracing::info!("Saved shortener '{}' -> '{}'", key, destination);
        Ok(())
    }

    /// Remove the record with this key, keeping the order of the rest.
    pub async fn remove(&self, key: &str) -> Result<ShortenerRecord, StoreError> {
        let mut records = self.records.write().await;

        let index =
            find_index(&records, key).ok_or_else(|| StoreError::KeyNotFound(key.to_owned()))?;

        let mut next = records.clone();
        let removed = next.remove(index);

        self.persist(&next).await?;
        *records = next;

        tracing::info!("Removed shortener '{}'", key);
        Ok(removed)
    }

    /// Overwrite the store file with `records`.
    ///
    /// The JSON goes to `<file>.tmp` first and is renamed over the real file,
    /// so a crash mid-write never leaves a truncated store behind.
    async fn persist(&self, records: &[ShortenerRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(records)?;
        let tmp = tmp_path(&self.path);

        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|source| StoreError::Write {
                path: tmp.clone(),
                source,
            })?;

        if let Err(source) = tokio::fs::rename(&tmp, &self.path).await {
            if let Err(e) = tokio::fs::remove_file(&tmp).await {
                tracing::warn!("Failed to clean up {}: {}", tmp.display(), e);
            }
            return Err(StoreError::Write {
                path: self.path.clone(),
                source,
            });
        }

        Ok(())
    }
}

fn find_index(records: &[ShortenerRecord], key: &str) -> Option<usize> {
    records.iter().position(|r| r.key == key)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Keep the first record for each key; hand-edited files may repeat one.
fn dedup_keys(records: Vec<ShortenerRecord>) -> Vec<ShortenerRecord> {
    let mut seen = std::collections::HashSet::new();
    records
        .into_iter()
        .filter(|r| {
            let first = seen.insert(r.key.clone());
            if !first {
                tracing::warn!("Ignoring duplicate shortener key '{}' in store file", r.key);
            }
            first
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn empty_store(dir: &tempfile::TempDir) -> Store {
        Store::load(dir.path().join("dbfile.json")).await.unwrap()
    }

    async fn on_disk(path: &Path) -> Vec<ShortenerRecord> {
        let raw = tokio::fs::read(path).await.unwrap();
        serde_json::from_slice(&raw).unwrap()
    }

    #[tokio::test]
    async fn load_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbfile.json");

        let store = Store::load(&path).await.unwrap();

        assert!(store.is_empty().await);
        assert!(path.exists());
        assert_eq!(tokio::fs::read(&path).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn load_treats_blank_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbfile.json");
        tokio::fs::write(&path, "  \n").await.unwrap();

        let store = Store::load(&path).await.unwrap();
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbfile.json");
        tokio::fs::write(&path, r#"{"Key": "not-an-array"}"#)
            .await
            .unwrap();

        let err = Store::load(&path).await.err().unwrap();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[tokio::test]
    async fn load_keeps_first_of_duplicate_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbfile.json");
        tokio::fs::write(
            &path,
            r#"[{"Key":"a","Dest":"one"},{"Key":"b","Dest":"two"},{"Key":"a","Dest":"three"}]"#,
        )
        .await
        .unwrap();

        let store = Store::load(&path).await.unwrap();
        assert_eq!(
            store.records().await,
            vec![
                ShortenerRecord::new("a", "one"),
                ShortenerRecord::new("b", "two")
            ]
        );
    }

    #[tokio::test]
    async fn upsert_appends_then_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = empty_store(&dir).await;

        store.upsert("go", "https://golang.org").await.unwrap();
        store.upsert("rs", "https://rust-lang.org").await.unwrap();
        store.upsert("go", "https://go.dev").await.unwrap();

        assert_eq!(store.len().await, 2);
        assert_eq!(store.find_index("go").await, Some(0));
        assert_eq!(
            store.find("go").await,
            Some(ShortenerRecord::new("go", "https://go.dev"))
        );
        assert_eq!(on_disk(store.path()).await, store.records().await);
    }

    #[tokio::test]
    async fn upsert_same_pair_twice_keeps_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = empty_store(&dir).await;

        store.upsert("go", "https://golang.org").await.unwrap();
        store.upsert("go", "https://golang.org").await.unwrap();

        assert_eq!(
            store.records().await,
            vec![ShortenerRecord::new("go", "https://golang.org")]
        );
    }

    #[tokio::test]
    async fn remove_preserves_order_of_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let store = empty_store(&dir).await;
        for key in ["a", "b", "c"] {
            store.upsert(key, key).await.unwrap();
        }

        let removed = store.remove("b").await.unwrap();

        assert_eq!(removed, ShortenerRecord::new("b", "b"));
        assert_eq!(
            store.records().await,
            vec![ShortenerRecord::new("a", "a"), ShortenerRecord::new("c", "c")]
        );
        assert_eq!(on_disk(store.path()).await, store.records().await);
    }

    #[tokio::test]
    async fn remove_unknown_key_is_key_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = empty_store(&dir).await;

        let err = store.remove("nope").await.err().unwrap();
        assert!(matches!(err, StoreError::KeyNotFound(key) if key == "nope"));
    }

    #[tokio::test]
    async fn reload_reproduces_records_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbfile.json");
        let store = Store::load(&path).await.unwrap();
        for i in 0..10 {
            store
                .upsert(&format!("k{i}"), &format!("https://example.com/{i}"))
                .await
                .unwrap();
        }
        let before = store.records().await;
        drop(store);

        let reloaded = Store::load(&path).await.unwrap();
        assert_eq!(reloaded.records().await, before);
    }

    #[tokio::test]
    async fn failed_write_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        tokio::fs::create_dir(&sub).await.unwrap();
        let store = Store::load(sub.join("dbfile.json")).await.unwrap();
        store.upsert("go", "https://golang.org").await.unwrap();

        tokio::fs::remove_dir_all(&sub).await.unwrap();

        let err = store.upsert("go", "https://go.dev").await.err().unwrap();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(store.remove("go").await.is_err());
        assert_eq!(
            store.records().await,
            vec![ShortenerRecord::new("go", "https://golang.org")]
        );
    }

    #[tokio::test]
    async fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbfile.json");
        let store = Store::load(&path).await.unwrap();

        // A non-empty directory in place of the file makes the rename fail.
        tokio::fs::remove_file(&path).await.unwrap();
        tokio::fs::create_dir(&path).await.unwrap();
        tokio::fs::write(path.join("keep"), b"x").await.unwrap();

        let err = store.upsert("go", "https://golang.org").await.err().unwrap();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(!tmp_path(&path).exists());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_upserts_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(empty_store(&dir).await);

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .upsert(&format!("k{i}"), &format!("https://example.com/{i}"))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.len().await, 32);
        assert_eq!(on_disk(store.path()).await.len(), 32);
    }
}
