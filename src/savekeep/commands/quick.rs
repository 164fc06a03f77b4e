//! Quick-save slot rotation.
//!
//! A fixed number of slots is reused LRU-style. Empty slots fill lowest number
//! first; once every slot is taken, the slot holding the oldest quick save is
//! reused. Reuse is delete-then-recreate, never an in-place rewrite.
//!
//! Every rotation also repairs the slot table: a slot claimed by several saves
//! keeps only its newest holder, and saves claiming a slot outside the current
//! range are evicted.

use crate::commands::create::{capture, persist_new};
use crate::commands::{CmdMessage, CmdResult, SaveContext};
use crate::error::Result;
use crate::host::Host;
use crate::model::{quick_slot_name, SaveRecord};
use crate::store::SaveStore;
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub async fn save<S: SaveStore, H: Host>(
    ctx: &SaveContext<'_, S, H>,
    slot_count: u8,
) -> Result<CmdResult> {
    // Capture before touching any slot so a failed capture evicts nothing.
    let (payload, scene) = capture(ctx)?;

    let (quick, stale) = split_stale(oldest_first(ctx).await?, slot_count);
    if !stale.is_empty() {
        warn!(
            title = ctx.title,
            stale = stale.len(),
            "quick slots held by duplicate or out-of-range saves, repairing"
        );
    }
    for record in &stale {
        ctx.store.delete(&record.id).await?;
        debug!(id = %record.id, slot = ?record.meta.quick_slot, "stale quick save evicted");
    }

    let target = pick_target_slot(&quick, slot_count);
    let holder = quick.iter().find(|r| r.meta.quick_slot == Some(target));

    let mut result = CmdResult::default();
    if let Some(evicted) = holder {
        ctx.store.delete(&evicted.id).await?;
        debug!(id = %evicted.id, slot = target, "quick slot evicted");
        result.add_message(CmdMessage::info(format!("Overwrote quick slot {}", target)));
    }

    let name = quick_slot_name(target, slot_count);
    let record = persist_new(ctx, Some(&name), Some(target), payload, scene).await?;
    result.add_message(CmdMessage::success(format!("Quick saved: {}", name)));
    Ok(result.with_affected_saves(vec![record]))
}

/// The most recent quick save of the current title.
pub async fn latest<S: SaveStore, H: Host>(
    ctx: &SaveContext<'_, S, H>,
) -> Result<Option<SaveRecord>> {
    Ok(ctx
        .store
        .list_by_title(ctx.title)
        .await?
        .into_iter()
        .find(SaveRecord::is_quick))
}

/// Quick saves of the current title, oldest first.
async fn oldest_first<S: SaveStore, H: Host>(
    ctx: &SaveContext<'_, S, H>,
) -> Result<Vec<SaveRecord>> {
    let mut quick: Vec<SaveRecord> = ctx
        .store
        .list_by_title(ctx.title)
        .await?
        .into_iter()
        .filter(SaveRecord::is_quick)
        .collect();
    quick.reverse();
    Ok(quick)
}

/// Split oldest-first quick saves into the slot table (one newest holder per
/// in-range slot, still oldest first) and the saves that must be evicted.
fn split_stale(quick: Vec<SaveRecord>, slot_count: u8) -> (Vec<SaveRecord>, Vec<SaveRecord>) {
    let mut seen = BTreeSet::new();
    let mut kept = Vec::new();
    let mut stale = Vec::new();
    for record in quick.into_iter().rev() {
        match record.meta.quick_slot {
            Some(slot) if (1..=slot_count).contains(&slot) && seen.insert(slot) => {
                kept.push(record)
            }
            _ => stale.push(record),
        }
    }
    kept.reverse();
    (kept, stale)
}

/// Choose the slot the next quick save goes to. `quick` must be oldest first.
pub fn pick_target_slot(quick: &[SaveRecord], slot_count: u8) -> u8 {
    let slots = 1..=slot_count.max(1);

    if quick.len() < usize::from(slot_count) {
        let in_use: BTreeSet<u8> = quick.iter().filter_map(|r| r.meta.quick_slot).collect();
        if let Some(free) = slots.clone().find(|s| !in_use.contains(s)) {
            return free;
        }
    }

    quick
        .iter()
        .filter_map(|r| r.meta.quick_slot)
        .find(|s| slots.contains(s))
        .unwrap_or(1)
}
