//! # API Facade
//!
//! [`SaveEngine`] is the single entry point for every save operation of one
//! title. It is a thin facade: it builds a [`SaveContext`] and dispatches to the
//! command layer, which holds the business logic.
//!
//! ## Generic Over Store and Host
//!
//! - Production: `SaveEngine<FileStore, StateFileHost>`
//! - Testing: `SaveEngine<MemoryStore, MockHost>`
//!
//! ## Quick-save serialization
//!
//! Store operations are individually atomic but the rotation sequence (list,
//! evict, create) is not. The engine holds a mutex around that sequence so two
//! quick saves issued through the same engine never interleave.

use crate::codec::Codec;
use crate::commands::{self, SaveContext};
use crate::config::SettingsHandle;
use crate::error::Result;
use crate::host::Host;
use crate::model::QUICK_SLOT_COUNT;
use crate::store::SaveStore;
use tokio::sync::Mutex;

pub struct SaveEngine<S: SaveStore, H: Host> {
    store: S,
    host: H,
    codec: Codec,
    settings: SettingsHandle,
    title: String,
    quick_slots: u8,
    quick_lock: Mutex<()>,
}

impl<S: SaveStore, H: Host> SaveEngine<S, H> {
    pub fn new(store: S, host: H, settings: SettingsHandle, title: impl Into<String>) -> Self {
        Self {
            store,
            host,
            codec: Codec::new(settings.clone()),
            settings,
            title: title.into(),
            quick_slots: QUICK_SLOT_COUNT,
            quick_lock: Mutex::new(()),
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Number of rotating quick slots (at least one).
    pub fn with_quick_slots(mut self, slots: u8) -> Self {
        self.quick_slots = slots.max(1);
        self
    }

    fn ctx(&self) -> SaveContext<'_, S, H> {
        SaveContext {
            store: &self.store,
            host: &self.host,
            codec: &self.codec,
            title: &self.title,
        }
    }

    pub async fn create_save(&self, name: Option<&str>) -> Result<commands::CmdResult> {
        commands::create::run(&self.ctx(), name).await
    }

    pub async fn quick_save(&self) -> Result<commands::CmdResult> {
        let _guard = self.quick_lock.lock().await;
        commands::quick::save(&self.ctx(), self.quick_slots).await
    }

    /// Load a save by display index or id.
    pub async fn load_save(&self, selector: &str) -> Result<commands::CmdResult> {
        let ctx = self.ctx();
        let record = commands::helpers::resolve_selectors(&ctx, &[selector])
            .await?
            .remove(0);
        commands::load::run(&ctx, &record.id).await
    }

    pub async fn quick_load(&self) -> Result<commands::CmdResult> {
        commands::load::quick_load(&self.ctx()).await
    }

    pub async fn list_saves(&self) -> Result<commands::CmdResult> {
        commands::list::run(&self.ctx()).await
    }

    pub async fn rename_save(&self, selector: &str, name: &str) -> Result<commands::CmdResult> {
        commands::rename::run(&self.ctx(), selector, name).await
    }

    pub async fn delete_saves<I: AsRef<str>>(
        &self,
        selectors: &[I],
    ) -> Result<commands::CmdResult> {
        commands::delete::run(&self.ctx(), selectors).await
    }

    pub async fn export_current_state(&self) -> Result<commands::CmdResult> {
        commands::export::current(&self.ctx()).await
    }

    /// Export the selected saves, or all saves of the title when none are given.
    pub async fn export_saves<I: AsRef<str>>(
        &self,
        selectors: &[I],
    ) -> Result<commands::CmdResult> {
        commands::export::saved(&self.ctx(), selectors).await
    }

    pub async fn import_bundle(&self, bundle: &str) -> Result<commands::CmdResult> {
        commands::import::run(&self.ctx(), bundle).await
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.settings, action)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn quick_slots(&self) -> u8 {
        self.quick_slots
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }
}

pub use crate::commands::config::ConfigAction;
pub use crate::host::RestorePath;
pub use commands::{CmdMessage, CmdResult, DisplaySave, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CompressionBackend;
    use crate::config::Settings;
    use crate::error::{PayloadError, SaveError};
    use crate::host::mock::MockHost;
    use crate::model::PayloadEncoding;
    use crate::store::memory::MemoryStore;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde_json::json;
    use std::sync::Arc;

    /// Base64 only, no deflate. Tagged as gzip so the codec routes to it.
    struct Base64Only;

    impl CompressionBackend for Base64Only {
        fn encoding(&self) -> PayloadEncoding {
            PayloadEncoding::Gzip
        }

        fn compress(&self, text: &str) -> std::result::Result<String, PayloadError> {
            Ok(STANDARD.encode(text))
        }

        fn decompress(&self, data: &str) -> std::result::Result<String, PayloadError> {
            Ok(String::from_utf8(STANDARD.decode(data)?)?)
        }
    }

    fn engine() -> SaveEngine<MemoryStore, MockHost> {
        SaveEngine::new(
            MemoryStore::new(),
            MockHost::new().with_state(json!({"hp": 3}), "Cave"),
            SettingsHandle::in_memory(Settings::default()),
            "cave-crawler",
        )
    }

    #[tokio::test]
    async fn load_accepts_display_index() {
        let engine = engine();
        engine.create_save(Some("one")).await.unwrap();

        let result = engine.load_save("1").await.unwrap();
        assert_eq!(result.restored, Some(RestorePath::Replayed));
    }

    #[tokio::test]
    async fn custom_backend_is_used_for_both_directions() {
        let settings = SettingsHandle::in_memory(Settings::default());
        let engine = SaveEngine::new(
            MemoryStore::new(),
            MockHost::new().with_state(json!({"hp": 7}), "Cave"),
            settings.clone(),
            "cave-crawler",
        )
        .with_codec(Codec::without_compression(settings).with_backend(Arc::new(Base64Only)));

        let saved = engine.create_save(None).await.unwrap();
        let payload = &saved.affected_saves[0].payload;
        assert_eq!(payload.tag, PayloadEncoding::Gzip);
        assert_eq!(STANDARD.decode(&payload.data).unwrap(), br#"{"hp":7}"#);

        engine.load_save("1").await.unwrap();
        assert_eq!(engine.host().restored()[0].1, json!({"hp": 7}));
    }

    #[test]
    fn quick_slot_count_has_a_floor_of_one() {
        assert_eq!(engine().quick_slots(), QUICK_SLOT_COUNT);
        assert_eq!(engine().with_quick_slots(0).quick_slots(), 1);
    }

    #[tokio::test]
    async fn quick_slot_count_is_configurable() {
        let engine = engine().with_quick_slots(2);
        assert_eq!(engine.quick_slots(), 2);
        let mut slots = Vec::new();
        for _ in 0..4 {
            let result = engine.quick_save().await.unwrap();
            slots.push(result.affected_saves[0].meta.quick_slot.unwrap());
        }
        assert_eq!(slots, vec![1, 2, 1, 2]);
        assert_eq!(engine.store().all().await.len(), 2);
        assert_eq!(
            engine.list_saves().await.unwrap().listed_saves[0].record.meta.name,
            "Slot 2/2"
        );
    }

    #[tokio::test]
    async fn concurrent_quick_saves_are_serialized() {
        let engine = Arc::new(engine());
        let mut handles = Vec::new();
        for _ in 0..12 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move { engine.quick_save().await.is_ok() }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        let mut slots: Vec<u8> = engine
            .store()
            .all()
            .await
            .iter()
            .filter_map(|r| r.meta.quick_slot)
            .collect();
        slots.sort_unstable();
        assert_eq!(slots, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn config_changes_affect_new_payloads() {
        let engine = engine();
        engine
            .config(ConfigAction::Set("compression".into(), "off".into()))
            .unwrap();
        assert!(!engine.settings().compression_enabled());
        let result = engine.create_save(None).await.unwrap();
        assert_eq!(
            result.affected_saves[0].payload.tag,
            crate::model::PayloadEncoding::Plain
        );
    }

    #[tokio::test]
    async fn errors_carry_user_facing_messages() {
        let engine = engine();
        let err = engine.load_save("3").await.unwrap_err();
        assert!(matches!(err, SaveError::RecordNotFound(_)));
        assert_eq!(err.to_string(), "Save not found: 3");
    }
}
