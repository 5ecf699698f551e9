//! Parlor Core Library
//!
//! Configuration and session persistence for the parlor chat client.
//!
//! # Architecture
//!
//! - **Sections**: independently serialized documents (main settings, auth
//!   cache, preferences, push rules, keymap), each with a declared format
//! - **Config**: owns the sections and the directory layout, and drives the
//!   room cache at startup, shutdown, and session reset
//!
//! # Quick Start
//!
//! ```text
//! let mut config = Config::new(&RootDirs::from_env());
//! config.load_all()?;
//!
//! config.preferences.hide_user_list = true;
//! config.save_all()?;
//!
//! // Log out
//! config.delete_session()?;
//! ```
//!
//! # Modules
//!
//! - `config`: Configuration aggregate and lifecycle operations
//! - `sections`: Section values and descriptors
//! - `codec`: YAML and JSON encodings
//! - `storage`: Section file persistence and errors
//! - `paths`: Directory layout
//! - `room_cache`: Room cache contract and file-backed implementation
//! - `sync_store`: Persistence used by the sync loop

pub mod codec;
pub mod config;
pub mod paths;
pub mod room_cache;
pub mod sections;
pub mod storage;
pub mod sync_store;

pub use codec::{CodecError, Format};
pub use config::Config;
pub use paths::{PathLayout, RootDirs};
pub use room_cache::{
    CurrentUser, FileRoomCache, RoomCache, RoomCacheError, RoomCacheFactory, RoomCacheParams,
    RoomState, RoomSummary,
};
pub use sections::{AuthCache, KeyMap, MainSettings, PushRuleset, Section, UserPreferences};
pub use storage::{ConfigError, ConfigResult, SectionStore};
pub use sync_store::SyncStore;
