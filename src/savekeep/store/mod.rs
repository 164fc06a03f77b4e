//! # Storage Layer
//!
//! Save records are persisted behind the async [`SaveStore`] trait so the engine
//! never knows which backend it talks to.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production storage, a single `saves.json` document in the
//!   data directory, rewritten atomically (tmp file then rename) on every change.
//! - [`memory::MemoryStore`]: in-memory storage for tests, no persistence.
//!
//! ## Ordering
//!
//! [`SaveStore::list_by_title`] returns records newest first. Callers rely on this
//! (the first quick record is the most recent, listings show newest on top), so it
//! is part of the store contract rather than left to each caller. Records sharing a
//! timestamp are ordered by insertion, later inserts first.
//!
//! ## Atomicity
//!
//! Each operation is atomic on its own. Nothing here spans several operations in a
//! transaction; sequences like "list, delete, create" are the engine's concern.

use crate::error::StoreError;
use crate::model::SaveRecord;
use async_trait::async_trait;
use std::cmp::Reverse;

pub mod fs;
pub mod memory;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait SaveStore: Send + Sync {
    /// Insert or replace a record by id.
    async fn put(&self, record: &SaveRecord) -> StoreResult<()>;

    async fn get(&self, id: &str) -> StoreResult<Option<SaveRecord>>;

    /// Remove a record. Removing an unknown id is not an error.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// All records of `title`, newest first.
    async fn list_by_title(&self, title: &str) -> StoreResult<Vec<SaveRecord>>;
}

/// Insert-or-replace into an insertion-ordered record list. A replaced record
/// keeps its original position.
pub(crate) fn upsert(records: &mut Vec<SaveRecord>, record: &SaveRecord) {
    match records.iter_mut().find(|r| r.id == record.id) {
        Some(existing) => *existing = record.clone(),
        None => records.push(record.clone()),
    }
}

/// Records of `title` from an insertion-ordered list, newest first.
pub(crate) fn newest_first(records: &[SaveRecord], title: &str) -> Vec<SaveRecord> {
    let mut matching: Vec<(usize, &SaveRecord)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.title == title)
        .collect();
    matching.sort_by_key(|(seq, r)| (Reverse(r.meta.timestamp), Reverse(*seq)));
    matching.into_iter().map(|(_, r)| r.clone()).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{Payload, PayloadEncoding, SaveMeta, FORMAT_VERSION};

    pub(crate) fn record(id: &str, title: &str, timestamp: i64) -> SaveRecord {
        SaveRecord {
            id: id.to_string(),
            title: title.to_string(),
            meta: SaveMeta {
                name: id.to_string(),
                scene: String::new(),
                timestamp,
                quick_slot: None,
                format_version: FORMAT_VERSION,
            },
            payload: Payload {
                data: "{}".to_string(),
                tag: PayloadEncoding::Plain,
            },
        }
    }

    #[test]
    fn newest_first_breaks_ties_by_insertion() {
        let records = vec![
            record("a", "t", 10),
            record("b", "t", 20),
            record("c", "t", 20),
            record("x", "other", 30),
        ];
        let ids: Vec<String> = newest_first(&records, "t").into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut records = vec![record("a", "t", 1), record("b", "t", 2)];
        let mut renamed = record("a", "t", 1);
        renamed.meta.name = "renamed".into();
        upsert(&mut records, &renamed);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].meta.name, "renamed");
    }
}
