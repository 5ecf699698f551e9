//! Room cache
//!
//! The room cache owns the room list and per-room state persistence. The
//! configuration only constructs it, replaces it on reset, and asks it to
//! load or save at startup and shutdown.

mod file_cache;

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

pub use file_cache::{FileRoomCache, RoomState, RoomSummary};

/// Errors reported by a room cache
#[derive(Error, Debug)]
pub enum RoomCacheError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid room data in '{path}': {details}")]
    Malformed { path: PathBuf, details: String },
}

/// Handle to the identifier of the logged-in user
///
/// The configuration keeps it up to date; room caches read it whenever they
/// need to know whose session a room belongs to.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(Rc<RefCell<String>>);

impl CurrentUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(user_id.into())))
    }

    pub fn get(&self) -> String {
        self.0.borrow().clone()
    }

    pub fn set(&self, user_id: &str) {
        let mut current = self.0.borrow_mut();
        current.clear();
        current.push_str(user_id);
    }
}

/// Everything a room cache is constructed with
#[derive(Debug, Clone)]
pub struct RoomCacheParams {
    pub room_list_path: PathBuf,
    pub state_dir: PathBuf,
    /// Maximum number of rooms kept loaded
    pub capacity: usize,
    /// Idle time after which a loaded room may be unloaded
    pub max_age: Duration,
    pub current_user: CurrentUser,
}

/// Persistence contract of a room cache
pub trait RoomCache {
    /// Load the room list from disk; a missing list is an empty list
    fn load_list(&mut self) -> Result<(), RoomCacheError>;

    /// Write the room list to disk
    fn save_list(&self) -> Result<(), RoomCacheError>;

    /// Persist every loaded room
    ///
    /// Failures for individual rooms are the cache's own business and are
    /// not reported.
    fn save_loaded_rooms(&mut self);

    /// Whether the cache holds no rooms at all
    fn is_empty(&self) -> bool;
}

/// Builds a room cache from its parameters
pub type RoomCacheFactory = Box<dyn Fn(RoomCacheParams) -> Box<dyn RoomCache>>;

/// Factory producing [`FileRoomCache`] instances
pub fn file_room_cache_factory() -> RoomCacheFactory {
    Box::new(|params: RoomCacheParams| -> Box<dyn RoomCache> {
        Box::new(FileRoomCache::new(params))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_is_shared() {
        let user = CurrentUser::new("@alice:example.org");
        let seen_by_cache = user.clone();

        user.set("@bob:example.org");
        assert_eq!(seen_by_cache.get(), "@bob:example.org");
    }

    #[test]
    fn test_default_factory_builds_empty_cache() {
        let factory = file_room_cache_factory();
        let cache = factory(RoomCacheParams {
            room_list_path: PathBuf::from("/nonexistent/rooms.json.gz"),
            state_dir: PathBuf::from("/nonexistent/state"),
            capacity: 4,
            max_age: Duration::from_secs(60),
            current_user: CurrentUser::default(),
        });
        assert!(cache.is_empty());
    }
}
