use super::{newest_first, upsert, SaveStore, StoreResult};
use crate::model::SaveRecord;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

const DATA_FILENAME: &str = "saves.json";

/// File-backed store. All records live in one JSON array in insertion order;
/// every mutation rewrites it atomically.
pub struct FileStore {
    root: PathBuf,
    // Serializes read-modify-write cycles so each operation is atomic.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn data_file(&self) -> PathBuf {
        self.root.join(DATA_FILENAME)
    }

    async fn load(&self) -> StoreResult<Vec<SaveRecord>> {
        let path = self.data_file();
        match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, records: &[SaveRecord]) -> StoreResult<()> {
        ensure_dir(&self.root).await?;
        let content = serde_json::to_string_pretty(records)?;

        let tmp_file = self.root.join(format!(".saves-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content).await?;
        if let Err(e) = fs::rename(&tmp_file, self.data_file()).await {
            let _ = fs::remove_file(&tmp_file).await;
            return Err(e.into());
        }
        debug!(count = records.len(), "store written");
        Ok(())
    }
}

async fn ensure_dir(path: &Path) -> StoreResult<()> {
    if !fs::try_exists(path).await? {
        fs::create_dir_all(path).await?;
    }
    Ok(())
}

#[async_trait]
impl SaveStore for FileStore {
    async fn put(&self, record: &SaveRecord) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        upsert(&mut records, record);
        self.save(&records).await
    }

    async fn get(&self, id: &str) -> StoreResult<Option<SaveRecord>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_iter().find(|r| r.id == id))
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(());
        }
        self.save(&records).await
    }

    async fn list_by_title(&self, title: &str) -> StoreResult<Vec<SaveRecord>> {
        let _guard = self.lock.lock().await;
        Ok(newest_first(&self.load().await?, title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::tests::record;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_is_an_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        assert!(store.list_by_title("game").await.unwrap().is_empty());
        assert!(store.get("nope").await.unwrap().is_none());
        store.delete("nope").await.unwrap();
        assert!(!store.data_file().exists());
    }

    #[tokio::test]
    async fn malformed_file_is_a_format_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DATA_FILENAME), "{ nope").unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.list_by_title("game").await,
            Err(StoreError::Format(_))
        ));
    }

    #[tokio::test]
    async fn writes_leave_no_tmp_files() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.put(&record("a", "game", 1)).await.unwrap();
        store.put(&record("b", "game", 2)).await.unwrap();

        for entry in std::fs::read_dir(dir.path()).unwrap() {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_str().unwrap().to_string();
            assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
        }
    }

    #[tokio::test]
    async fn failed_rename_removes_the_tmp_file() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        // A non-empty directory where the data file belongs cannot be replaced.
        std::fs::create_dir_all(store.data_file().join("blocker")).unwrap();

        assert!(store.save(&[record("a", "game", 1)]).await.is_err());
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
        }
    }
}
