use crate::commands::{quick, CmdMessage, CmdResult, SaveContext};
use crate::error::{HostError, Result, SaveError};
use crate::host::{Host, RestorePath};
use crate::model::SaveRecord;
use crate::store::SaveStore;
use serde_json::Value;
use tracing::{error, info, warn};

pub async fn run<S: SaveStore, H: Host>(
    ctx: &SaveContext<'_, S, H>,
    id: &str,
) -> Result<CmdResult> {
    let record = ctx
        .store
        .get(id)
        .await?
        .filter(|r| r.title == ctx.title)
        .ok_or_else(|| SaveError::RecordNotFound(id.to_string()))?;
    load_record(ctx, record).await
}

/// Load the most recent quick save.
pub async fn quick_load<S: SaveStore, H: Host>(
    ctx: &SaveContext<'_, S, H>,
) -> Result<CmdResult> {
    let record = quick::latest(ctx)
        .await?
        .ok_or_else(|| SaveError::RecordNotFound("no quick saves yet".to_string()))?;
    load_record(ctx, record).await
}

async fn load_record<S: SaveStore, H: Host>(
    ctx: &SaveContext<'_, S, H>,
    record: SaveRecord,
) -> Result<CmdResult> {
    let state = ctx.codec.decode(&record.payload)?;

    let path = restore(ctx.host, &state).await.map_err(|e| {
        error!(id = %record.id, error = %e, "restoring save failed");
        SaveError::LoadFailed(e.to_string())
    })?;
    info!(id = %record.id, ?path, "save loaded");

    let mut result = CmdResult::default();
    result.restored = Some(path);
    result.add_message(CmdMessage::success(format!("Loaded: {}", record.meta.name)));
    Ok(result.with_affected_saves(vec![record]))
}

/// Hand `state` to the host: native replay first, injection only when replay is
/// unavailable or fails.
pub async fn restore<H: Host>(host: &H, state: &Value) -> std::result::Result<RestorePath, HostError> {
    if host.can_replay() {
        match host.replay(state).await {
            Ok(()) => return Ok(RestorePath::Replayed),
            Err(e) if host.can_inject() => {
                warn!(error = %e, "native replay failed, falling back to injection");
            }
            Err(e) => return Err(e),
        }
    }

    if host.can_inject() {
        host.inject_and_reload(state).await?;
        return Ok(RestorePath::Injected);
    }

    Err(HostError::Unsupported("restoring saved state"))
}
