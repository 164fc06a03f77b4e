use super::{newest_first, upsert, SaveStore, StoreResult};
use crate::error::StoreError;
use crate::model::SaveRecord;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<SaveRecord>>,
    simulate_failure: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail, for exercising error paths.
    pub fn set_simulate_failure(&self, fail: bool) {
        self.simulate_failure.store(fail, Ordering::SeqCst);
    }

    /// Every record regardless of title, in insertion order.
    pub async fn all(&self) -> Vec<SaveRecord> {
        self.records.read().await.clone()
    }

    fn check(&self) -> StoreResult<()> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            return Err(StoreError::Other("Simulated store failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SaveStore for MemoryStore {
    async fn put(&self, record: &SaveRecord) -> StoreResult<()> {
        self.check()?;
        upsert(&mut *self.records.write().await, record);
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<SaveRecord>> {
        self.check()?;
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.check()?;
        self.records.write().await.retain(|r| r.id != id);
        Ok(())
    }

    async fn list_by_title(&self, title: &str) -> StoreResult<Vec<SaveRecord>> {
        self.check()?;
        Ok(newest_first(&self.records.read().await, title))
    }
}
