//! Bundle import.
//!
//! Bundles are checked in order: shape (a JSON array), format version of the
//! first entry, then per-entry validity. Nothing is persisted unless every check
//! passes, and every imported record is re-homed to the importing title.
//! Imported quick saves whose slot is already taken become manual saves.

use crate::commands::{CmdMessage, CmdResult, SaveContext};
use crate::error::{Result, SaveError};
use crate::host::Host;
use crate::model::{SaveRecord, FORMAT_VERSION};
use crate::store::SaveStore;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Records accepted from a bundle, already re-homed.
#[derive(Debug)]
pub struct ParsedBundle {
    pub records: Vec<SaveRecord>,
    pub skipped: usize,
}

pub async fn run<S: SaveStore, H: Host>(
    ctx: &SaveContext<'_, S, H>,
    bundle: &str,
) -> Result<CmdResult> {
    let mut parsed = parse_bundle(bundle, ctx.title)?;

    // Slots held by saves the import does not replace.
    let incoming: BTreeSet<String> = parsed.records.iter().map(|r| r.id.clone()).collect();
    let mut taken: BTreeSet<u8> = ctx
        .store
        .list_by_title(ctx.title)
        .await?
        .iter()
        .filter(|r| !incoming.contains(&r.id))
        .filter_map(|r| r.meta.quick_slot)
        .collect();
    for record in &mut parsed.records {
        if let Some(slot) = record.meta.quick_slot {
            if !taken.insert(slot) {
                debug!(id = %record.id, slot, "quick slot taken, importing as manual save");
                record.meta.quick_slot = None;
            }
        }
    }

    for record in &parsed.records {
        ctx.store.put(record).await?;
        debug!(id = %record.id, "save imported");
    }

    let mut result = CmdResult::default();
    if parsed.skipped > 0 {
        warn!(skipped = parsed.skipped, "bundle entries skipped");
        result.add_message(CmdMessage::warning(format!(
            "Skipped {} invalid entr{}",
            parsed.skipped,
            if parsed.skipped == 1 { "y" } else { "ies" }
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Imported {} save(s)",
        parsed.records.len()
    )));
    Ok(result.with_affected_saves(parsed.records))
}

pub fn parse_bundle(bundle: &str, title: &str) -> Result<ParsedBundle> {
    let value: Value = serde_json::from_str(bundle).map_err(SaveError::CorruptedBundle)?;
    let entries = value.as_array().ok_or(SaveError::InvalidFormat)?;

    let first = entries.first().ok_or(SaveError::NoValidRecords)?;
    if !first.get("meta").is_some_and(Value::is_object) {
        return Err(SaveError::CorruptedBundle(serde::de::Error::custom(
            "first entry is not a save record",
        )));
    }
    let found = first.pointer("/meta/formatVersion").and_then(Value::as_u64);
    if found != Some(u64::from(FORMAT_VERSION)) {
        return Err(SaveError::IncompatibleVersion {
            found,
            expected: FORMAT_VERSION,
        });
    }

    let mut records = Vec::new();
    for entry in entries.iter().filter(|e| is_importable(e)) {
        let mut record: SaveRecord =
            serde_json::from_value(entry.clone()).map_err(SaveError::CorruptedBundle)?;
        record.title = title.to_string();
        records.push(record);
    }

    if records.is_empty() {
        return Err(SaveError::NoValidRecords);
    }
    Ok(ParsedBundle {
        skipped: entries.len() - records.len(),
        records,
    })
}

fn is_importable(entry: &Value) -> bool {
    let non_empty = |pointer: &str| {
        entry
            .pointer(pointer)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    };
    let has_timestamp = entry
        .pointer("/meta/timestamp")
        .is_some_and(|t| !t.is_null());

    non_empty("/id") && non_empty("/payload/data") && has_timestamp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{Fixture, TITLE};
    use crate::commands::{create, export, quick};
    use crate::model::QUICK_SLOT_COUNT;
    use serde_json::json;

    fn entry(id: &str, version: u32) -> Value {
        json!({
            "id": id,
            "title": "some-other-game",
            "meta": {
                "name": format!("save {}", id),
                "scene": "",
                "timestamp": 1_700_000_000_000_i64,
                "quickSlot": null,
                "formatVersion": version
            },
            "payload": {"data": "{\"turn\":3}", "tag": "plain"}
        })
    }

    #[tokio::test]
    async fn imports_valid_entries_rehomed() {
        let fx = Fixture::new();
        let mut missing_id = entry("", FORMAT_VERSION);
        missing_id.as_object_mut().unwrap().remove("id");
        let bundle = json!([entry("a", 1), missing_id, entry("b", 1)]).to_string();

        let result = run(&fx.ctx(), &bundle).await.unwrap();
        assert_eq!(result.affected_saves.len(), 2);

        let stored = fx.store.all().await;
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|r| r.title == TITLE));
        assert!(stored.iter().any(|r| r.id == "a"));
        assert!(stored.iter().any(|r| r.id == "b"));
    }

    #[tokio::test]
    async fn newer_format_is_rejected_and_nothing_persists() {
        let fx = Fixture::new();
        let bundle = json!([entry("a", 2), entry("b", 1)]).to_string();

        let err = run(&fx.ctx(), &bundle).await.unwrap_err();
        assert!(matches!(
            err,
            SaveError::IncompatibleVersion { found: Some(2), expected: 1 }
        ));
        assert!(fx.store.all().await.is_empty());
    }

    #[test]
    fn shape_errors() {
        assert!(matches!(
            parse_bundle(r#"{"id": "a"}"#, TITLE),
            Err(SaveError::InvalidFormat)
        ));
        assert!(matches!(
            parse_bundle("not json at all", TITLE),
            Err(SaveError::CorruptedBundle(_))
        ));
        assert!(matches!(parse_bundle("[]", TITLE), Err(SaveError::NoValidRecords)));
    }

    #[test]
    fn missing_version_is_incompatible() {
        let mut e = entry("a", 1);
        e["meta"].as_object_mut().unwrap().remove("formatVersion");
        let bundle = json!([e]).to_string();
        assert!(matches!(
            parse_bundle(&bundle, TITLE),
            Err(SaveError::IncompatibleVersion { found: None, .. })
        ));
    }

    #[test]
    fn first_entry_that_is_not_a_record_is_corrupted() {
        for bundle in [r#"[42]"#, r#"["save"]"#, r#"[{"id": "a"}]"#, r#"[{"meta": 1}]"#] {
            assert!(
                matches!(parse_bundle(bundle, TITLE), Err(SaveError::CorruptedBundle(_))),
                "bundle {}",
                bundle
            );
        }
    }

    #[test]
    fn entries_without_payload_or_timestamp_are_skipped() {
        let mut no_payload = entry("a", 1);
        no_payload["payload"]["data"] = json!("");
        let mut no_time = entry("b", 1);
        no_time["meta"]["timestamp"] = Value::Null;
        let bundle = json!([no_payload, no_time]).to_string();
        assert!(matches!(parse_bundle(&bundle, TITLE), Err(SaveError::NoValidRecords)));
    }

    #[test]
    fn malformed_valid_looking_entry_is_corrupted() {
        let mut bad = entry("a", 1);
        bad["payload"]["tag"] = json!("zstd");
        let bundle = json!([bad]).to_string();
        assert!(matches!(
            parse_bundle(&bundle, TITLE),
            Err(SaveError::CorruptedBundle(_))
        ));
    }

    #[tokio::test]
    async fn imported_quick_saves_never_share_a_slot() {
        let fx = Fixture::new();
        for _ in 0..5 {
            quick::save(&fx.ctx_for("other"), QUICK_SLOT_COUNT).await.unwrap();
        }
        let exported = export::saved::<_, _, &str>(&fx.ctx_for("other"), &[])
            .await
            .unwrap();
        for _ in 0..5 {
            quick::save(&fx.ctx(), QUICK_SLOT_COUNT).await.unwrap();
        }

        run(&fx.ctx(), exported.bundle.as_ref().unwrap()).await.unwrap();
        let slots = |records: Vec<SaveRecord>| {
            let mut slots: Vec<u8> = records.iter().filter_map(|r| r.meta.quick_slot).collect();
            slots.sort_unstable();
            slots
        };
        let listed = fx.store.list_by_title(TITLE).await.unwrap();
        assert_eq!(listed.len(), 10);
        assert_eq!(slots(listed), vec![1, 2, 3, 4, 5]);

        quick::save(&fx.ctx(), QUICK_SLOT_COUNT).await.unwrap();
        let listed = fx.store.list_by_title(TITLE).await.unwrap();
        assert_eq!(slots(listed), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn imported_quick_saves_fill_free_slots() {
        let fx = Fixture::new();
        quick::save(&fx.ctx_for("other"), QUICK_SLOT_COUNT).await.unwrap();
        quick::save(&fx.ctx_for("other"), QUICK_SLOT_COUNT).await.unwrap();
        let exported = export::saved::<_, _, &str>(&fx.ctx_for("other"), &[])
            .await
            .unwrap();
        quick::save(&fx.ctx(), QUICK_SLOT_COUNT).await.unwrap();

        let result = run(&fx.ctx(), exported.bundle.as_ref().unwrap()).await.unwrap();
        let mut imported: Vec<Option<u8>> = result
            .affected_saves
            .iter()
            .map(|r| r.meta.quick_slot)
            .collect();
        imported.sort_unstable();
        assert_eq!(imported, vec![None, Some(2)]);
    }

    #[tokio::test]
    async fn export_then_import_into_another_title() {
        let fx = Fixture::new();
        create::run(&fx.ctx(), Some("portable")).await.unwrap();
        let exported = export::saved::<_, _, &str>(&fx.ctx(), &[]).await.unwrap();

        run(&fx.ctx_for("new-home"), exported.bundle.as_ref().unwrap())
            .await
            .unwrap();
        let moved = fx.store.list_by_title("new-home").await.unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].meta.name, "portable");
    }
}
