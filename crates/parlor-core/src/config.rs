//! Client configuration and session state
//!
//! `Config` owns every persisted section and the directory layout, and holds
//! the room cache. Sections are stored as:
//! - `<config>/config.yaml` - main settings
//! - `<config>/keymaps/<name>.yaml` - key bindings
//! - `<cache>/auth-cache.yaml` - sync token and filter ID
//! - `<cache>/preferences.yaml` - display toggles
//! - `<cache>/pushrules.json` - cached notification rules
//!
//! After [`Config::clear`] nothing is saved anymore until
//! [`Config::delete_session`] has finished resetting the session.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::paths::{PathLayout, RootDirs};
use crate::room_cache::{
    file_room_cache_factory, CurrentUser, RoomCache, RoomCacheFactory, RoomCacheParams,
};
use crate::sections::{AuthCache, KeyMap, MainSettings, PushRuleset, Section, UserPreferences};
use crate::storage::{ensure_dir, ConfigResult, SectionStore};

/// Configuration aggregate of the client
pub struct Config {
    paths: PathLayout,

    pub settings: MainSettings,
    pub auth_cache: AuthCache,
    pub preferences: UserPreferences,
    /// Absent until the server has sent a rule set
    pub push_rules: Option<PushRuleset>,
    pub keymap: KeyMap,

    rooms: Box<dyn RoomCache>,
    room_cache_factory: RoomCacheFactory,
    current_user: CurrentUser,
    store: SectionStore,
}

impl Config {
    /// Create a configuration rooted at the given directories
    ///
    /// Nothing is read or created on disk until a load, save, or
    /// [`Config::create_cache_dirs`] is called.
    pub fn new(roots: &RootDirs) -> Self {
        Self::with_room_cache_factory(roots, file_room_cache_factory())
    }

    /// Create a configuration that builds its room caches with `factory`
    pub fn with_room_cache_factory(roots: &RootDirs, factory: RoomCacheFactory) -> Self {
        let paths = PathLayout::new(roots);
        let settings = MainSettings::default();
        let current_user = CurrentUser::new(settings.user_id.as_str());
        let rooms = factory(room_cache_params(&paths, &settings, &current_user));

        Self {
            paths,
            settings,
            auth_cache: AuthCache::default(),
            preferences: UserPreferences::default(),
            push_rules: None,
            keymap: KeyMap::default(),
            rooms,
            room_cache_factory: factory,
            current_user,
            store: SectionStore::new(),
        }
    }

    pub fn paths(&self) -> &PathLayout {
        &self.paths
    }

    pub fn rooms(&self) -> &dyn RoomCache {
        self.rooms.as_ref()
    }

    pub fn rooms_mut(&mut self) -> &mut dyn RoomCache {
        self.rooms.as_mut()
    }

    /// Handle through which room caches see the logged-in user
    pub fn current_user(&self) -> CurrentUser {
        self.current_user.clone()
    }

    pub fn user_id(&self) -> &str {
        &self.settings.user_id
    }

    /// Change the logged-in user, making it visible to the room cache at once
    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.settings.user_id = user_id.into();
        self.current_user.set(&self.settings.user_id);
    }

    /// Whether saves are skipped because the session was cleared
    pub fn is_save_suppressed(&self) -> bool {
        self.store.is_suppressed()
    }

    /// Load every section needed at startup
    ///
    /// Order: main settings, fresh room cache, auth cache, push rules,
    /// preferences, room list. Any failure aborts the whole load.
    pub fn load_all(&mut self) -> ConfigResult<()> {
        self.load()?;
        self.rooms = self.new_room_cache();
        self.load_auth_cache()?;
        self.load_push_rules()?;
        self.load_preferences()?;
        self.rooms.load_list()?;
        Ok(())
    }

    /// Load main settings from `config.yaml` and create the cache directories
    pub fn load(&mut self) -> ConfigResult<()> {
        if let Some(settings) = self.load_section(&Section::main_settings())? {
            self.settings = settings;
        }
        self.current_user.set(&self.settings.user_id);
        self.create_cache_dirs()
    }

    /// Save every section and the room cache
    ///
    /// Cheap sections are written first so they are durable even if saving
    /// the room cache fails.
    pub fn save_all(&mut self) -> ConfigResult<()> {
        self.save()?;
        self.save_auth_cache()?;
        self.save_push_rules()?;
        self.save_preferences()?;

        if self.store.is_suppressed() {
            return Ok(());
        }
        self.rooms.save_list()?;
        self.rooms.save_loaded_rooms();
        Ok(())
    }

    /// Save main settings to `config.yaml`
    pub fn save(&self) -> ConfigResult<()> {
        self.save_section(&Section::main_settings(), &self.settings)
    }

    pub fn load_preferences(&mut self) -> ConfigResult<()> {
        if let Some(preferences) = self.load_section(&Section::preferences())? {
            self.preferences = preferences;
        }
        Ok(())
    }

    pub fn save_preferences(&self) -> ConfigResult<()> {
        self.save_section(&Section::preferences(), &self.preferences)
    }

    pub fn load_auth_cache(&mut self) -> ConfigResult<()> {
        if let Some(auth_cache) = self.load_section(&Section::auth_cache())? {
            self.auth_cache = auth_cache;
        }
        Ok(())
    }

    pub fn save_auth_cache(&self) -> ConfigResult<()> {
        self.save_section(&Section::auth_cache(), &self.auth_cache)
    }

    pub fn load_push_rules(&mut self) -> ConfigResult<()> {
        let loaded: Option<Option<PushRuleset>> = self.load_section(&Section::push_rules())?;
        if let Some(push_rules) = loaded {
            self.push_rules = push_rules;
        }
        Ok(())
    }

    /// Save the cached push rules; does nothing when there are none
    pub fn save_push_rules(&self) -> ConfigResult<()> {
        match &self.push_rules {
            Some(push_rules) => self.save_section(&Section::push_rules(), push_rules),
            None => Ok(()),
        }
    }

    /// Load the bindings of the active keymap from `keymaps/<name>.yaml`
    pub fn load_keymap(&mut self) -> ConfigResult<()> {
        let section = Section::keymap(&self.settings.keymap);
        if let Some(keymap) = self.load_section(&section)? {
            self.keymap = keymap;
        }
        Ok(())
    }

    /// Create the data, cache, state, and media directories
    pub fn create_cache_dirs(&self) -> ConfigResult<()> {
        for dir in self.paths.cache_dirs() {
            ensure_dir(dir)?;
        }
        Ok(())
    }

    /// Remove the session cache and history, then stop saving
    ///
    /// Removal is best-effort. Saving stays disabled until
    /// [`Config::delete_session`] completes.
    pub fn clear(&mut self) {
        remove_file(&self.paths.history_path);
        remove_file(&self.paths.room_list_path);
        remove_dir(&self.paths.state_dir);
        remove_dir(&self.paths.media_dir);
        remove_dir(&self.paths.cache_dir);
        self.store.suppress();
        info!(cache_dir = ?self.paths.cache_dir, "Cleared session cache, saving disabled");
    }

    /// Remove non-temporary session data (best-effort)
    pub fn clear_data(&self) {
        remove_dir(&self.paths.data_dir);
        info!(data_dir = ?self.paths.data_dir, "Cleared session data");
    }

    /// Forget the current login session
    ///
    /// Clears the sync token and login credentials, replaces the room cache
    /// with an empty one, drops cached push rules, wipes data and cache
    /// directories, re-enables saving, and recreates the directories.
    pub fn delete_session(&mut self) -> ConfigResult<()> {
        self.auth_cache.next_batch.clear();
        self.auth_cache.initial_sync_done = false;
        self.settings.access_token.clear();
        self.settings.device_id.clear();
        self.rooms = self.new_room_cache();
        self.push_rules = None;

        self.clear_data();
        self.clear();
        self.store.resume();
        info!("Deleted session");

        self.create_cache_dirs()
    }

    fn new_room_cache(&self) -> Box<dyn RoomCache> {
        (self.room_cache_factory)(room_cache_params(
            &self.paths,
            &self.settings,
            &self.current_user,
        ))
    }

    fn load_section<T: DeserializeOwned>(&self, section: &Section) -> ConfigResult<Option<T>> {
        self.store
            .load_section(section, self.paths.dir_for(section.location))
    }

    fn save_section<T: Serialize + ?Sized>(&self, section: &Section, value: &T) -> ConfigResult<()> {
        self.store
            .save_section(section, self.paths.dir_for(section.location), value)
    }
}

fn room_cache_params(
    paths: &PathLayout,
    settings: &MainSettings,
    current_user: &CurrentUser,
) -> RoomCacheParams {
    RoomCacheParams {
        room_list_path: paths.room_list_path.clone(),
        state_dir: paths.state_dir.clone(),
        capacity: settings.room_cache_size,
        max_age: Duration::from_secs(settings.room_cache_age),
        current_user: current_user.clone(),
    }
}

fn remove_file(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = ?path, error = %e, "Failed to remove file");
        }
    }
}

fn remove_dir(path: &Path) {
    if let Err(e) = fs::remove_dir_all(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = ?path, error = %e, "Failed to remove directory");
        }
    }
}
