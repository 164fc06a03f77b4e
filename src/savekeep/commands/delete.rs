use crate::commands::{CmdMessage, CmdResult, SaveContext};
use crate::error::Result;
use crate::host::Host;
use crate::store::SaveStore;
use tracing::debug;

use super::helpers::resolve_selectors;

pub async fn run<S: SaveStore, H: Host, I: AsRef<str>>(
    ctx: &SaveContext<'_, S, H>,
    selectors: &[I],
) -> Result<CmdResult> {
    // Resolve everything first: indexes shift once deletion starts.
    let records = resolve_selectors(ctx, selectors).await?;
    let mut result = CmdResult::default();

    for record in &records {
        ctx.store.delete(&record.id).await?;
        debug!(id = %record.id, "save deleted");
        result.add_message(CmdMessage::success(format!(
            "Deleted: {}",
            record.meta.name
        )));
    }

    Ok(result.with_affected_saves(records))
}
