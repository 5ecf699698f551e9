//! File-backed room cache
//!
//! Files:
//! - `rooms.json.gz` - gzip-compressed JSON list of room summaries
//! - `state/<room id>.json` - state of one room, written when it is unloaded
//!   or when all loaded rooms are saved

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{RoomCache, RoomCacheError, RoomCacheParams};
use crate::storage::section_store::{create_private_dir, write_private};

/// Entry of the room list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Unix timestamp (seconds) of the latest known activity
    #[serde(default)]
    pub last_activity: u64,
}

/// Persisted state of a single room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomState {
    pub room_id: String,
    /// User whose session this state was recorded in
    #[serde(default)]
    pub session_user_id: String,
    #[serde(default)]
    pub state: serde_json::Value,
}

impl RoomState {
    pub fn new(room_id: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            room_id: room_id.into(),
            session_user_id: String::new(),
            state,
        }
    }
}

#[derive(Debug)]
struct LoadedRoom {
    state: RoomState,
    touched: Instant,
}

/// Room cache keeping a bounded number of rooms in memory
pub struct FileRoomCache {
    params: RoomCacheParams,
    list: BTreeMap<String, RoomSummary>,
    loaded: HashMap<String, LoadedRoom>,
}

impl FileRoomCache {
    pub fn new(params: RoomCacheParams) -> Self {
        Self {
            params,
            list: BTreeMap::new(),
            loaded: HashMap::new(),
        }
    }

    /// All known rooms, ordered by room ID
    pub fn rooms(&self) -> impl Iterator<Item = &RoomSummary> {
        self.list.values()
    }

    pub fn summary(&self, room_id: &str) -> Option<&RoomSummary> {
        self.list.get(room_id)
    }

    /// Add or replace a room list entry
    pub fn put_summary(&mut self, summary: RoomSummary) {
        self.list.insert(summary.room_id.clone(), summary);
    }

    /// Number of rooms currently held in memory
    pub fn loaded_len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_loaded(&self, room_id: &str) -> bool {
        self.loaded.contains_key(room_id)
    }

    /// Get a room's state, loading it from disk if needed
    ///
    /// Returns `Ok(None)` if the room has never been saved.
    pub fn get(&mut self, room_id: &str) -> Result<Option<&RoomState>, RoomCacheError> {
        if !self.loaded.contains_key(room_id) {
            let path = self.state_path(room_id);
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(source) => return Err(RoomCacheError::Read { path, source }),
            };
            let state: RoomState =
                serde_json::from_slice(&bytes).map_err(|e| RoomCacheError::Malformed {
                    path: path.clone(),
                    details: e.to_string(),
                })?;
            self.insert_loaded(state);
        }

        Ok(self.loaded.get_mut(room_id).map(|room| {
            room.touched = Instant::now();
            &room.state
        }))
    }

    /// Store a room's state in memory
    ///
    /// The room is added to the room list if it is not known yet. If more
    /// rooms than the capacity are loaded, the least recently used ones are
    /// saved and unloaded.
    pub fn put(&mut self, mut state: RoomState) {
        state.session_user_id = self.params.current_user.get();
        if !self.list.contains_key(&state.room_id) {
            self.put_summary(RoomSummary {
                room_id: state.room_id.clone(),
                name: None,
                last_activity: 0,
            });
        }
        self.insert_loaded(state);
    }

    /// Save and unload rooms idle for longer than the maximum age
    ///
    /// Returns the number of rooms unloaded.
    pub fn unload_expired(&mut self) -> usize {
        let max_age = self.params.max_age;
        let expired: Vec<String> = self
            .loaded
            .iter()
            .filter(|(_, room)| room.touched.elapsed() > max_age)
            .map(|(id, _)| id.clone())
            .collect();

        expired.iter().filter(|id| self.unload(id)).count()
    }

    fn insert_loaded(&mut self, state: RoomState) {
        let room_id = state.room_id.clone();
        self.loaded.insert(
            room_id.clone(),
            LoadedRoom {
                state,
                touched: Instant::now(),
            },
        );
        self.evict_over_capacity(&room_id);
    }

    fn evict_over_capacity(&mut self, keep: &str) {
        let capacity = self.params.capacity.max(1);
        while self.loaded.len() > capacity {
            let oldest = self
                .loaded
                .iter()
                .filter(|(id, _)| id.as_str() != keep)
                .min_by_key(|(_, room)| room.touched)
                .map(|(id, _)| id.clone());

            match oldest {
                Some(id) if self.unload(&id) => {}
                // Keep the room in memory rather than lose unsaved state
                _ => break,
            }
        }
    }

    /// Save a loaded room and drop it from memory. Returns false if the save failed.
    fn unload(&mut self, room_id: &str) -> bool {
        let Some(room) = self.loaded.get(room_id) else {
            return false;
        };

        match self.save_room(&room.state) {
            Ok(()) => {
                self.loaded.remove(room_id);
                debug!(room_id, "Unloaded room");
                true
            }
            Err(e) => {
                warn!(room_id, error = %e, "Failed to save room, keeping it loaded");
                false
            }
        }
    }

    fn save_room(&self, state: &RoomState) -> Result<(), RoomCacheError> {
        let path = self.state_path(&state.room_id);
        create_private_dir(&self.params.state_dir).map_err(|source| RoomCacheError::Write {
            path: self.params.state_dir.clone(),
            source,
        })?;

        let bytes = serde_json::to_vec(state).map_err(|e| RoomCacheError::Malformed {
            path: path.clone(),
            details: e.to_string(),
        })?;
        write_private(&path, &bytes).map_err(|source| RoomCacheError::Write { path, source })
    }

    fn state_path(&self, room_id: &str) -> PathBuf {
        let file_name: String = room_id
            .chars()
            .map(|c| match c {
                '/' | '\\' => '_',
                c => c,
            })
            .collect();
        self.params.state_dir.join(format!("{}.json", file_name))
    }
}

impl RoomCache for FileRoomCache {
    fn load_list(&mut self) -> Result<(), RoomCacheError> {
        let path = &self.params.room_list_path;
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?path, "No room list on disk");
                return Ok(());
            }
            Err(source) => {
                return Err(RoomCacheError::Read {
                    path: path.clone(),
                    source,
                })
            }
        };

        let mut json = Vec::new();
        GzDecoder::new(file)
            .read_to_end(&mut json)
            .map_err(|e| RoomCacheError::Malformed {
                path: path.clone(),
                details: e.to_string(),
            })?;

        let rooms: Vec<RoomSummary> =
            serde_json::from_slice(&json).map_err(|e| RoomCacheError::Malformed {
                path: path.clone(),
                details: e.to_string(),
            })?;

        self.list = rooms
            .into_iter()
            .map(|room| (room.room_id.clone(), room))
            .collect();
        debug!(path = ?path, rooms = self.list.len(), "Loaded room list");
        Ok(())
    }

    fn save_list(&self) -> Result<(), RoomCacheError> {
        let path = &self.params.room_list_path;
        let write_err = |source| RoomCacheError::Write {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            create_private_dir(parent).map_err(write_err)?;
        }

        let rooms: Vec<&RoomSummary> = self.list.values().collect();
        let json = serde_json::to_vec(&rooms).map_err(|e| RoomCacheError::Malformed {
            path: path.clone(),
            details: e.to_string(),
        })?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json).map_err(write_err)?;
        let compressed = encoder.finish().map_err(write_err)?;

        write_private(path, &compressed).map_err(write_err)?;
        debug!(path = ?path, rooms = rooms.len(), "Saved room list");
        Ok(())
    }

    fn save_loaded_rooms(&mut self) {
        for room in self.loaded.values() {
            if let Err(e) = self.save_room(&room.state) {
                warn!(room_id = %room.state.room_id, error = %e, "Failed to save room");
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.list.is_empty() && self.loaded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room_cache::CurrentUser;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_params(temp_dir: &TempDir, capacity: usize) -> RoomCacheParams {
        RoomCacheParams {
            room_list_path: temp_dir.path().join("rooms.json.gz"),
            state_dir: temp_dir.path().join("state"),
            capacity,
            max_age: Duration::from_secs(60),
            current_user: CurrentUser::new("@alice:example.org"),
        }
    }

    fn summary(room_id: &str) -> RoomSummary {
        RoomSummary {
            room_id: room_id.to_string(),
            name: Some(format!("Room {}", room_id)),
            last_activity: 1_700_000_000,
        }
    }

    #[test]
    fn test_missing_list_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = FileRoomCache::new(test_params(&temp_dir, 4));

        cache.load_list().unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_list_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = FileRoomCache::new(test_params(&temp_dir, 4));
        cache.put_summary(summary("!a:example.org"));
        cache.put_summary(summary("!b:example.org"));
        cache.save_list().unwrap();

        let mut reloaded = FileRoomCache::new(test_params(&temp_dir, 4));
        reloaded.load_list().unwrap();
        let ids: Vec<&str> = reloaded.rooms().map(|r| r.room_id.as_str()).collect();
        assert_eq!(ids, vec!["!a:example.org", "!b:example.org"]);
        assert_eq!(
            reloaded.summary("!a:example.org").unwrap().name.as_deref(),
            Some("Room !a:example.org")
        );
    }

    #[test]
    fn test_corrupt_list_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("rooms.json.gz"), b"not gzip").unwrap();

        let mut cache = FileRoomCache::new(test_params(&temp_dir, 4));
        let err = cache.load_list().unwrap_err();
        assert!(matches!(err, RoomCacheError::Malformed { .. }));
    }

    #[test]
    fn test_put_stamps_current_user() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = FileRoomCache::new(test_params(&temp_dir, 4));

        cache.put(RoomState::new("!a:example.org", json!({"topic": "hi"})));
        let state = cache.get("!a:example.org").unwrap().unwrap();
        assert_eq!(state.session_user_id, "@alice:example.org");
        assert!(cache.summary("!a:example.org").is_some());
    }

    #[test]
    fn test_capacity_unloads_least_recent() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = FileRoomCache::new(test_params(&temp_dir, 2));

        cache.put(RoomState::new("!a:example.org", json!(1)));
        std::thread::sleep(Duration::from_millis(5));
        cache.put(RoomState::new("!b:example.org", json!(2)));
        std::thread::sleep(Duration::from_millis(5));
        cache.put(RoomState::new("!c:example.org", json!(3)));

        assert_eq!(cache.loaded_len(), 2);
        assert!(!cache.is_loaded("!a:example.org"));
        assert!(temp_dir.path().join("state/!a:example.org.json").exists());

        // Reloading from disk brings the state back
        let state = cache.get("!a:example.org").unwrap().unwrap();
        assert_eq!(state.state, json!(1));
    }

    #[test]
    fn test_unload_expired() {
        let temp_dir = TempDir::new().unwrap();
        let mut params = test_params(&temp_dir, 4);
        params.max_age = Duration::from_millis(1);
        let mut cache = FileRoomCache::new(params);

        cache.put(RoomState::new("!a:example.org", json!({})));
        std::thread::sleep(Duration::from_millis(10));

        assert_eq!(cache.unload_expired(), 1);
        assert_eq!(cache.loaded_len(), 0);
    }

    #[test]
    fn test_save_loaded_rooms() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = FileRoomCache::new(test_params(&temp_dir, 4));
        cache.put(RoomState::new("!a:example.org", json!({"n": 1})));
        cache.save_loaded_rooms();

        let raw = fs::read(temp_dir.path().join("state/!a:example.org.json")).unwrap();
        let saved: RoomState = serde_json::from_slice(&raw).unwrap();
        assert_eq!(saved.state, json!({"n": 1}));
        assert_eq!(saved.session_user_id, "@alice:example.org");
    }

    #[test]
    fn test_unknown_room_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = FileRoomCache::new(test_params(&temp_dir, 4));
        assert!(cache.get("!missing:example.org").unwrap().is_none());
    }
}
