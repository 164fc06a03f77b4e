//! # Savekeep Architecture
//!
//! Savekeep gives an application with no native multi-slot saving an external,
//! durable save layer: named saves, rotating quick-save slots, and portable
//! export/import bundles, all stored locally and partitioned per running title.
//!
//! It is a library first. The bundled CLI is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs, print.rs)                     │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - SaveEngine: one title, thin facade over commands         │
//! │  - Serializes quick-save rotation                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Create, quick-save rotation, load, import/export         │
//! │  - Returns CmdResult, never prints                          │
//! └─────────────────────────────────────────────────────────────┘
//!                │                 │                  │
//!                ▼                 ▼                  ▼
//! ┌────────────────────┐ ┌───────────────────┐ ┌──────────────────┐
//! │ Codec (codec.rs)   │ │ Store (store/)    │ │ Host (host.rs)   │
//! │ plain / gzip       │ │ async SaveStore   │ │ capture/restore  │
//! └────────────────────┘ └───────────────────┘ └──────────────────┘
//! ```
//!
//! ## Key Rules
//!
//! - The command layer is the only writer of save records.
//! - Every listing is scoped to exactly one title.
//! - A quick slot is held by at most one record per title; reusing a slot deletes
//!   the old record and creates a new one.
//! - Bundles with a foreign format version are rejected, never migrated.
//! - Settings are passed in explicitly through a [`config::SettingsHandle`].
//!
//! ## Module Overview
//!
//! - [`api`]: The engine facade, entry point for all operations
//! - [`commands`]: Business logic for each operation
//! - [`store`]: Storage abstraction and implementations
//! - [`codec`]: Payload encoding and compression
//! - [`host`]: The host application's capture/restore interface
//! - [`model`]: Core data types (`SaveRecord`, `SaveMeta`, `Payload`)
//! - [`config`]: Process-wide settings
//! - [`error`]: Error types

pub mod api;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod model;
pub mod store;
