use crate::commands::{CmdMessage, CmdResult, SaveContext};
use crate::error::{Result, SaveError};
use crate::host::Host;
use crate::model::{parse_default_name, Payload, SaveRecord, DEFAULT_NAME_PREFIX};
use crate::store::SaveStore;
use tracing::debug;

pub async fn run<S: SaveStore, H: Host>(
    ctx: &SaveContext<'_, S, H>,
    name: Option<&str>,
) -> Result<CmdResult> {
    let record = create_record(ctx, name, None).await?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Saved: {}", record.meta.name)));
    Ok(result.with_affected_saves(vec![record]))
}

/// Capture the host's state and encode it. Returns the payload and scene label.
pub(crate) fn capture<S: SaveStore, H: Host>(
    ctx: &SaveContext<'_, S, H>,
) -> Result<(Payload, String)> {
    let captured = ctx
        .host
        .capture_state()
        .map_err(SaveError::NoCapturableState)?;
    let payload = ctx.codec.encode(&captured.state)?;
    Ok((payload, captured.scene))
}

/// Capture, name and persist a new record.
pub(crate) async fn create_record<S: SaveStore, H: Host>(
    ctx: &SaveContext<'_, S, H>,
    name: Option<&str>,
    quick_slot: Option<u8>,
) -> Result<SaveRecord> {
    let (payload, scene) = capture(ctx)?;
    persist_new(ctx, name, quick_slot, payload, scene).await
}

pub(crate) async fn persist_new<S: SaveStore, H: Host>(
    ctx: &SaveContext<'_, S, H>,
    name: Option<&str>,
    quick_slot: Option<u8>,
    payload: Payload,
    scene: String,
) -> Result<SaveRecord> {
    let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => next_default_name(&ctx.store.list_by_title(ctx.title).await?),
    };

    let record = SaveRecord::new(ctx.title, name, scene, quick_slot, payload);
    ctx.store.put(&record).await?;
    debug!(id = %record.id, name = %record.meta.name, ?quick_slot, "save created");
    Ok(record)
}

/// "Save N" where N is one past the highest default-named manual save that
/// currently exists. Recomputed from the live listing on every call. Names whose
/// number cannot be incremented are ignored.
pub fn next_default_name(records: &[SaveRecord]) -> String {
    let next = records
        .iter()
        .filter(|r| !r.is_quick())
        .filter_map(|r| parse_default_name(&r.meta.name)?.checked_add(1))
        .max()
        .unwrap_or(1);
    format!("{}{}", DEFAULT_NAME_PREFIX, next)
}
