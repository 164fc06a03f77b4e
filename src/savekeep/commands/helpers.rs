use crate::commands::{DisplaySave, SaveContext};
use crate::error::{Result, SaveError};
use crate::host::Host;
use crate::model::SaveRecord;
use crate::store::SaveStore;

/// The current title's saves, newest first, numbered from 1.
pub async fn indexed_saves<S: SaveStore, H: Host>(
    ctx: &SaveContext<'_, S, H>,
) -> Result<Vec<DisplaySave>> {
    Ok(ctx
        .store
        .list_by_title(ctx.title)
        .await?
        .into_iter()
        .enumerate()
        .map(|(i, record)| DisplaySave {
            index: i + 1,
            record,
        })
        .collect())
}

/// Resolve selectors to records. A selector is either a display index from the
/// listing ("1" is the newest save) or a record id.
pub async fn resolve_selectors<S: SaveStore, H: Host, I: AsRef<str>>(
    ctx: &SaveContext<'_, S, H>,
    selectors: &[I],
) -> Result<Vec<SaveRecord>> {
    let listed = indexed_saves(ctx).await?;
    selectors
        .iter()
        .map(|selector| find_selected(&listed, selector.as_ref()))
        .collect()
}

fn find_selected(listed: &[DisplaySave], selector: &str) -> Result<SaveRecord> {
    let selector = selector.trim();
    let by_index = selector
        .parse::<usize>()
        .ok()
        .and_then(|n| listed.iter().find(|dp| dp.index == n));
    by_index
        .or_else(|| listed.iter().find(|dp| dp.record.id == selector))
        .map(|dp| dp.record.clone())
        .ok_or_else(|| SaveError::RecordNotFound(selector.to_string()))
}
