//! Portable bundles.
//!
//! A bundle is a JSON array of save records exactly as stored. Field names and
//! order are part of the interchange format.

use crate::commands::create::capture;
use crate::commands::{CmdMessage, CmdResult, SaveContext};
use crate::error::{Result, SaveError};
use crate::host::Host;
use crate::model::SaveRecord;
use crate::store::SaveStore;
use chrono::Utc;

use super::helpers::resolve_selectors;

/// Bundle a snapshot of the current state. Nothing is stored.
pub async fn current<S: SaveStore, H: Host>(ctx: &SaveContext<'_, S, H>) -> Result<CmdResult> {
    let (payload, scene) = capture(ctx)?;
    let name = format!("Export {}", Utc::now().format("%Y-%m-%d %H:%M"));
    let snapshot = SaveRecord::new(ctx.title, name, scene, None, payload);

    let bundle = to_bundle(std::slice::from_ref(&snapshot))?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("Exported current state"));
    Ok(result
        .with_affected_saves(vec![snapshot])
        .with_bundle(bundle))
}

/// Bundle stored saves. No selectors means every save of the current title.
pub async fn saved<S: SaveStore, H: Host, I: AsRef<str>>(
    ctx: &SaveContext<'_, S, H>,
    selectors: &[I],
) -> Result<CmdResult> {
    let records = if selectors.is_empty() {
        ctx.store.list_by_title(ctx.title).await?
    } else {
        resolve_selectors(ctx, selectors).await?
    };

    let mut result = CmdResult::default();
    if records.is_empty() {
        result.add_message(CmdMessage::info("No saves to export."));
        return Ok(result);
    }

    let bundle = to_bundle(&records)?;
    result.add_message(CmdMessage::success(format!(
        "Exported {} save(s)",
        records.len()
    )));
    Ok(result.with_affected_saves(records).with_bundle(bundle))
}

pub fn to_bundle(records: &[SaveRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).map_err(SaveError::CorruptedBundle)
}

/// File name for an exported bundle of `title`.
pub fn bundle_filename(title: &str) -> String {
    format!(
        "{}-saves-{}.json",
        sanitize_filename(title),
        Utc::now().format("%Y-%m-%d_%H-%M-%S")
    )
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}
