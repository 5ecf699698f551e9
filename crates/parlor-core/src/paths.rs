//! Directory layout
//!
//! Roots are resolved from:
//! 1. Environment variables (PARLOR_* prefix)
//! 2. Platform directories (`~/.config/parlor`, `~/.local/share/parlor`, ...)
//!
//! Everything else is derived from the roots once, when the layout is built.

use std::path::{Path, PathBuf};

use crate::sections::Location;

/// Environment variable prefix
const ENV_PREFIX: &str = "PARLOR";

/// Application directory name under each platform root
const APP_DIR: &str = "parlor";

/// The four roots everything else is derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDirs {
    pub config: PathBuf,
    pub data: PathBuf,
    pub cache: PathBuf,
    pub download: PathBuf,
}

impl RootDirs {
    /// Resolve roots from the environment, falling back to platform defaults
    pub fn from_env() -> Self {
        Self {
            config: env_override("CONFIG_DIR").unwrap_or_else(|| app_dir(dirs::config_dir())),
            data: env_override("DATA_DIR").unwrap_or_else(|| app_dir(dirs::data_dir())),
            cache: env_override("CACHE_DIR").unwrap_or_else(|| app_dir(dirs::cache_dir())),
            download: env_override("DOWNLOAD_DIR").unwrap_or_else(default_download_dir),
        }
    }

    /// Roots placed under a single base directory (useful for testing)
    pub fn under(base: &Path) -> Self {
        Self {
            config: base.join("config"),
            data: base.join("data"),
            cache: base.join("cache"),
            download: base.join("downloads"),
        }
    }
}

/// Every directory and file path the configuration touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathLayout {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub download_dir: PathBuf,
    pub history_path: PathBuf,
    pub room_list_path: PathBuf,
    pub state_dir: PathBuf,
    pub media_dir: PathBuf,
    pub keymap_dir: PathBuf,
}

impl PathLayout {
    pub fn new(roots: &RootDirs) -> Self {
        Self {
            config_dir: roots.config.clone(),
            data_dir: roots.data.clone(),
            cache_dir: roots.cache.clone(),
            download_dir: roots.download.clone(),
            history_path: roots.cache.join("history.db"),
            room_list_path: roots.cache.join("rooms.json.gz"),
            state_dir: roots.cache.join("state"),
            media_dir: roots.cache.join("media"),
            keymap_dir: roots.config.join("keymaps"),
        }
    }

    /// Directory a section of the given location is stored in
    pub fn dir_for(&self, location: Location) -> &Path {
        match location {
            Location::Config => &self.config_dir,
            Location::Cache => &self.cache_dir,
            Location::Keymaps => &self.keymap_dir,
        }
    }

    /// Directories recreated after a reset
    pub fn cache_dirs(&self) -> [&Path; 4] {
        [
            &self.cache_dir,
            &self.data_dir,
            &self.state_dir,
            &self.media_dir,
        ]
    }
}

fn env_override(name: &str) -> Option<PathBuf> {
    std::env::var_os(format!("{}_{}", ENV_PREFIX, name))
        .filter(|val| !val.is_empty())
        .map(PathBuf::from)
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}
