//! Store used by the sync loop
//!
//! The sync loop persists its continuation token and filter ID through this
//! trait after every cycle. Rooms are persisted by the room cache, never
//! through this path.

use crate::config::Config;
use crate::room_cache::RoomState;
use crate::storage::{ConfigError, ConfigResult};

/// Persistence needed by the sync loop
///
/// Every method takes the user the value belongs to. [`Config`] holds a
/// single login and ignores it.
pub trait SyncStore {
    fn save_filter_id(&mut self, user_id: &str, filter_id: &str) -> ConfigResult<()>;
    fn load_filter_id(&self, user_id: &str) -> String;
    fn save_next_batch(&mut self, user_id: &str, next_batch: &str) -> ConfigResult<()>;
    fn load_next_batch(&self, user_id: &str) -> String;
    fn save_room(&mut self, room: &RoomState) -> ConfigResult<()>;
    fn load_room(&self, room_id: &str) -> ConfigResult<Option<RoomState>>;
}

impl SyncStore for Config {
    /// Set the filter ID and save the auth cache immediately
    fn save_filter_id(&mut self, _user_id: &str, filter_id: &str) -> ConfigResult<()> {
        self.auth_cache.filter_id = filter_id.to_string();
        self.save_auth_cache()
    }

    fn load_filter_id(&self, _user_id: &str) -> String {
        self.auth_cache.filter_id.clone()
    }

    /// Set the sync token and save the auth cache immediately
    fn save_next_batch(&mut self, _user_id: &str, next_batch: &str) -> ConfigResult<()> {
        self.auth_cache.next_batch = next_batch.to_string();
        self.save_auth_cache()
    }

    fn load_next_batch(&self, _user_id: &str) -> String {
        self.auth_cache.next_batch.clone()
    }

    fn save_room(&mut self, _room: &RoomState) -> ConfigResult<()> {
        Err(ConfigError::UnsupportedOperation {
            operation: "save_room",
        })
    }

    fn load_room(&self, _room_id: &str) -> ConfigResult<Option<RoomState>> {
        Err(ConfigError::UnsupportedOperation {
            operation: "load_room",
        })
    }
}
