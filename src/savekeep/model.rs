use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Schema tag written into every record's metadata. Bundles carrying any other
/// version are rejected on import.
pub const FORMAT_VERSION: u32 = 1;

/// Default number of rotating quick-save slots.
pub const QUICK_SLOT_COUNT: u8 = 5;

/// Name prefix used for auto-generated manual save names ("Save 1", "Save 2", ...).
pub const DEFAULT_NAME_PREFIX: &str = "Save ";

/// Transform applied to a payload's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadEncoding {
    Plain,
    Gzip,
}

impl fmt::Display for PayloadEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadEncoding::Plain => write!(f, "plain"),
            PayloadEncoding::Gzip => write!(f, "gzip"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub data: String,
    pub tag: PayloadEncoding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMeta {
    pub name: String,
    #[serde(default)]
    pub scene: String,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
    /// `None` for manual saves.
    pub quick_slot: Option<u8>,
    pub format_version: u32,
}

impl SaveMeta {
    pub fn is_quick(&self) -> bool {
        self.quick_slot.is_some()
    }
}

/// One persisted unit of captured state plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub id: String,
    pub title: String,
    pub meta: SaveMeta,
    pub payload: Payload,
}

impl SaveRecord {
    pub fn new(
        title: &str,
        name: String,
        scene: String,
        quick_slot: Option<u8>,
        payload: Payload,
    ) -> Self {
        let timestamp = Utc::now().timestamp_millis();
        Self {
            id: new_save_id(title, timestamp),
            title: title.to_string(),
            meta: SaveMeta {
                name,
                scene,
                timestamp,
                quick_slot,
                format_version: FORMAT_VERSION,
            },
            payload,
        }
    }

    pub fn is_quick(&self) -> bool {
        self.meta.is_quick()
    }
}

/// Ids combine title, creation millis and a random suffix so two records created
/// in the same millisecond never collide.
pub fn new_save_id(title: &str, timestamp: i64) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", title, timestamp, &random[..8])
}

/// Name given to the record occupying a quick slot.
pub fn quick_slot_name(slot: u8, slot_count: u8) -> String {
    format!("Slot {}/{}", slot, slot_count)
}

/// Returns N when `name` is exactly the auto-generated "Save N".
pub fn parse_default_name(name: &str) -> Option<u64> {
    let digits = name.strip_prefix(DEFAULT_NAME_PREFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// State captured from the host, ready to be encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedState {
    pub state: serde_json::Value,
    pub scene: String,
}

impl CapturedState {
    pub fn new(state: serde_json::Value, scene: impl Into<String>) -> Self {
        Self {
            state,
            scene: scene.into(),
        }
    }
}
