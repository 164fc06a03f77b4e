use crate::commands::{CmdMessage, CmdResult, SaveContext};
use crate::error::{Result, SaveError};
use crate::host::Host;
use crate::store::SaveStore;

use super::helpers::resolve_selectors;

/// Change a save's name. Nothing else about the record changes.
pub async fn run<S: SaveStore, H: Host>(
    ctx: &SaveContext<'_, S, H>,
    selector: &str,
    name: &str,
) -> Result<CmdResult> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SaveError::InvalidName);
    }

    let mut record = resolve_selectors(ctx, &[selector])
        .await?
        .remove(0);
    let old_name = std::mem::replace(&mut record.meta.name, name.to_string());
    ctx.store.put(&record).await?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Renamed: {} -> {}",
        old_name, record.meta.name
    )));
    Ok(result.with_affected_saves(vec![record]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create;
    use crate::commands::fixtures::Fixture;

    #[tokio::test]
    async fn renames_without_touching_payload() {
        let fx = Fixture::new();
        let created = create::run(&fx.ctx(), Some("old")).await.unwrap();
        let original = created.affected_saves[0].clone();

        run(&fx.ctx(), &original.id, "  new name ").await.unwrap();

        let stored = fx.store.get(&original.id).await.unwrap().unwrap();
        assert_eq!(stored.meta.name, "new name");
        assert_eq!(stored.payload, original.payload);
        assert_eq!(stored.meta.timestamp, original.meta.timestamp);
    }

    #[tokio::test]
    async fn rejects_blank_names() {
        let fx = Fixture::new();
        create::run(&fx.ctx(), Some("keep")).await.unwrap();
        assert!(matches!(
            run(&fx.ctx(), "1", "   ").await,
            Err(SaveError::InvalidName)
        ));
    }
}
