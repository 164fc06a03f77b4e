//! # Command Layer
//!
//! Business logic for every save operation. Commands take a [`SaveContext`]
//! (store, host, codec, current title) and return a [`CmdResult`]; they never
//! print and never assume a terminal.

use crate::codec::Codec;
use crate::config::Settings;
use crate::host::{Host, RestorePath};
use crate::model::SaveRecord;
use crate::store::SaveStore;

pub mod config;
pub mod create;
pub mod delete;
pub mod export;
pub mod helpers;
pub mod import;
pub mod list;
pub mod load;
pub mod quick;
pub mod rename;

/// Everything a command needs to act on behalf of one title.
pub struct SaveContext<'a, S: SaveStore, H: Host> {
    pub store: &'a S,
    pub host: &'a H,
    pub codec: &'a Codec,
    pub title: &'a str,
}

/// A record paired with its position in the newest-first listing (1 = newest).
#[derive(Debug, Clone)]
pub struct DisplaySave {
    pub index: usize,
    pub record: SaveRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_saves: Vec<SaveRecord>,
    pub listed_saves: Vec<DisplaySave>,
    /// Serialized bundle produced by an export.
    pub bundle: Option<String>,
    pub restored: Option<RestorePath>,
    pub settings: Option<Settings>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_saves(mut self, saves: Vec<SaveRecord>) -> Self {
        self.affected_saves = saves;
        self
    }

    pub fn with_listed_saves(mut self, saves: Vec<DisplaySave>) -> Self {
        self.listed_saves = saves;
        self
    }

    pub fn with_bundle(mut self, bundle: String) -> Self {
        self.bundle = Some(bundle);
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }
}
