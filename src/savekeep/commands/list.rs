use crate::commands::{CmdResult, SaveContext};
use crate::error::Result;
use crate::host::Host;
use crate::store::SaveStore;

use super::helpers::indexed_saves;

pub async fn run<S: SaveStore, H: Host>(ctx: &SaveContext<'_, S, H>) -> Result<CmdResult> {
    let listed = indexed_saves(ctx).await?;
    Ok(CmdResult::default().with_listed_saves(listed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::Fixture;
    use crate::commands::{create, quick};
    use crate::model::QUICK_SLOT_COUNT;

    #[tokio::test]
    async fn lists_newest_first_for_current_title_only() {
        let fx = Fixture::new();
        create::run(&fx.ctx(), Some("first")).await.unwrap();
        quick::save(&fx.ctx(), QUICK_SLOT_COUNT).await.unwrap();
        create::run(&fx.ctx_for("elsewhere"), Some("foreign")).await.unwrap();

        let result = run(&fx.ctx()).await.unwrap();
        let names: Vec<&str> = result
            .listed_saves
            .iter()
            .map(|dp| dp.record.meta.name.as_str())
            .collect();
        assert_eq!(names, vec!["Slot 1/5", "first"]);
        assert_eq!(result.listed_saves[0].index, 1);
    }
}
