//! Persistable configuration sections
//!
//! Each section is an independently serialized document with a fixed label,
//! directory, file name, and format. The values themselves are plain data;
//! nothing here validates their contents.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::Format;

/// Name of the keymap selected when none is configured
pub const DEFAULT_KEYMAP: &str = "default";

/// Default number of rooms kept loaded by the room cache
pub const DEFAULT_ROOM_CACHE_SIZE: usize = 32;

/// Default idle time, in seconds, before a loaded room may be unloaded
pub const DEFAULT_ROOM_CACHE_AGE: u64 = 60;

/// Which root directory a section file lives under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Config,
    Cache,
    Keymaps,
}

/// Where and how one section is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Human-readable name used in logs and errors
    pub label: &'static str,
    pub location: Location,
    pub file_name: Cow<'static, str>,
    pub format: Format,
}

impl Section {
    pub fn main_settings() -> Self {
        Self::fixed("config", Location::Config, "config.yaml", Format::Yaml)
    }

    pub fn preferences() -> Self {
        Self::fixed(
            "user preferences",
            Location::Cache,
            "preferences.yaml",
            Format::Yaml,
        )
    }

    pub fn auth_cache() -> Self {
        Self::fixed("auth cache", Location::Cache, "auth-cache.yaml", Format::Yaml)
    }

    pub fn push_rules() -> Self {
        Self::fixed("push rules", Location::Cache, "pushrules.json", Format::Json)
    }

    /// The keymap file is named after the active keymap
    pub fn keymap(name: &str) -> Self {
        Self {
            label: "keymap",
            location: Location::Keymaps,
            file_name: Cow::Owned(format!("{}.{}", name, Format::Yaml.extension())),
            format: Format::Yaml,
        }
    }

    fn fixed(
        label: &'static str,
        location: Location,
        file_name: &'static str,
        format: Format,
    ) -> Self {
        Self {
            label,
            location,
            file_name: Cow::Borrowed(file_name),
            format,
        }
    }
}

/// Identity, tunables, and keymap selection stored in `config.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainSettings {
    #[serde(rename = "mxid")]
    pub user_id: String,
    pub device_id: String,
    pub access_token: String,
    #[serde(rename = "homeserver")]
    pub server: String,

    /// Maximum number of rooms kept loaded at once
    pub room_cache_size: usize,
    /// Seconds a loaded room may stay idle before it can be unloaded
    pub room_cache_age: u64,

    pub notify_sound: bool,
    pub send_to_verified_only: bool,

    /// Name of the keymap file under `keymaps/`
    pub keymap: String,
}

impl Default for MainSettings {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            device_id: String::new(),
            access_token: String::new(),
            server: String::new(),
            room_cache_size: DEFAULT_ROOM_CACHE_SIZE,
            room_cache_age: DEFAULT_ROOM_CACHE_AGE,
            notify_sound: true,
            send_to_verified_only: false,
            keymap: DEFAULT_KEYMAP.to_string(),
        }
    }
}

impl MainSettings {
    /// Whether a login session is stored
    pub fn has_session(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// Sync state persisted after every sync cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthCache {
    pub next_batch: String,
    pub filter_id: String,
    pub initial_sync_done: bool,
}

/// Display and behaviour toggles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub hide_user_list: bool,
    pub hide_room_list: bool,
    pub bare_message_view: bool,
    pub disable_images: bool,
    pub disable_typing_notifs: bool,
    pub disable_emojis: bool,
    pub disable_markdown: bool,
    pub disable_html: bool,
    pub disable_downloads: bool,
    pub disable_notifications: bool,
    pub disable_show_urls: bool,
}

/// Server-provided notification rules, cached verbatim
///
/// The rule set is never interpreted here; it is kept as a JSON value so it
/// round-trips exactly as the server sent it. A JSON `null` is not a rule
/// set: it is what an absent one is stored as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PushRuleset(serde_json::Value);

impl PushRuleset {
    /// Wrap a rule set received from the server; `null` means there is none
    pub fn new(value: serde_json::Value) -> Option<Self> {
        if value.is_null() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Key bindings for UI actions
///
/// Values are key strings as written in the keymap file. An empty string
/// means the action is unbound in that file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMap {
    /// Close the verification modal once finished
    pub verification_done: String,
    /// Confirm or reject a verification
    pub verification_submit: String,

    pub fuzzy_search_open: String,
    #[serde(rename = "fuzzy_search_cancel")]
    pub fuzzy_search_close: String,
    pub fuzzy_search_next: String,
    pub fuzzy_search_prev: String,
    pub fuzzy_search_choose: String,

    pub room_next: String,
    pub room_prev: String,

    pub room_view_top: String,
    pub room_view_bottom: String,
    pub room_view_scroll_up: String,
    pub room_view_scroll_down: String,

    pub message_select_cancel: String,
    pub message_select_next: String,
    pub message_select_prev: String,
    pub message_select_choose: String,

    pub message_input_newline: String,
    pub message_input_clear: String,
    pub message_input_send: String,

    pub bare_view_open: String,
}

impl KeyMap {
    /// Flatten into action name -> key string, skipping unbound actions
    pub fn bindings(&self) -> BTreeMap<String, String> {
        let value = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => return BTreeMap::new(),
        };

        value
            .into_iter()
            .filter_map(|(action, key)| match key {
                serde_json::Value::String(key) if !key.is_empty() => Some((action, key)),
                _ => None,
            })
            .collect()
    }
}
