use crate::commands::{CmdMessage, CmdResult};
use crate::config::SettingsHandle;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    ShowAll,
    Get(String),
    Set(String, String),
}

pub fn run(settings: &SettingsHandle, action: ConfigAction) -> Result<CmdResult> {
    let current = settings.get();
    let mut result = CmdResult::default();

    match action {
        ConfigAction::ShowAll => {
            for key in [
                "compression",
                "position",
                "buttons.save",
                "buttons.load",
                "buttons.quick-save",
                "buttons.quick-load",
                "buttons.export",
                "buttons.import",
            ] {
                result.add_message(CmdMessage::info(format!(
                    "{}: {}",
                    key,
                    current.get_key(key)?
                )));
            }
            Ok(result.with_settings(current))
        }
        ConfigAction::Get(key) => {
            result.add_message(CmdMessage::info(format!(
                "{}: {}",
                key,
                current.get_key(&key)?
            )));
            Ok(result.with_settings(current))
        }
        ConfigAction::Set(key, value) => {
            let next = current.with_key(&key, &value)?;
            settings.apply(next.clone())?;
            result.add_message(CmdMessage::success(format!("{} set to {}", key, value)));
            Ok(result.with_settings(next))
        }
    }
}
