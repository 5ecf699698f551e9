//! Section file persistence
//!
//! Loads tolerate a missing file (first run) but never a corrupt one. Saves
//! write to a temporary file first and rename it over the target, so a
//! section file is always either the old or the new document.
//!
//! Directories are created owner-only (`0700`), files are written owner-only
//! (`0600`).

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};

use super::error::{ConfigError, ConfigResult};
use crate::sections::Section;

/// Loads and saves sections, honouring the save-suppression flag
///
/// Once suppressed, every save is a silent no-op until the owner resumes
/// saving. Loads are never affected.
#[derive(Debug, Default)]
pub struct SectionStore {
    suppressed: bool,
}

impl SectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether saves are currently skipped
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub(crate) fn suppress(&mut self) {
        self.suppressed = true;
    }

    pub(crate) fn resume(&mut self) {
        self.suppressed = false;
    }

    /// Load a section from `dir`
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load_section<T: DeserializeOwned>(
        &self,
        section: &Section,
        dir: &Path,
    ) -> ConfigResult<Option<T>> {
        ensure_dir(dir)?;

        let path = dir.join(section.file_name.as_ref());
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(section = section.label, path = ?path, "Section file missing, using defaults");
                return Ok(None);
            }
            Err(source) => {
                return Err(ConfigError::FileReadFailed {
                    section: section.label,
                    path,
                    source,
                })
            }
        };

        let value = section
            .format
            .decode(&bytes)
            .map_err(|e| ConfigError::MalformedData {
                section: section.label,
                path: path.clone(),
                details: e.to_string(),
            })?;

        debug!(section = section.label, path = ?path, "Loaded section");
        Ok(Some(value))
    }

    /// Save a section into `dir`, replacing any existing file
    pub fn save_section<T: Serialize + ?Sized>(
        &self,
        section: &Section,
        dir: &Path,
        value: &T,
    ) -> ConfigResult<()> {
        if self.suppressed {
            debug!(section = section.label, "Saving suppressed, skipping section");
            return Ok(());
        }

        ensure_dir(dir)?;

        let bytes = section
            .format
            .encode(value)
            .map_err(|e| ConfigError::EncodeFailed {
                section: section.label,
                details: e.to_string(),
            })?;

        let path = dir.join(section.file_name.as_ref());
        write_private(&path, &bytes).map_err(|source| ConfigError::FileWriteFailed {
            section: section.label,
            path: path.clone(),
            source,
        })?;

        debug!(section = section.label, path = ?path, "Saved section");
        Ok(())
    }
}

/// Create `dir` and its parents with owner-only permissions
pub fn ensure_dir(dir: &Path) -> ConfigResult<()> {
    create_private_dir(dir).map_err(|source| ConfigError::DirectoryCreateFailed {
        path: dir.to_path_buf(),
        source,
    })
}

pub(crate) fn create_private_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
    }

    #[cfg(not(unix))]
    {
        fs::create_dir_all(dir)
    }
}

/// Write data to a file atomically with owner-only permissions
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// On failure the temporary file is removed again.
pub(crate) fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    let temp_path = path.with_extension("tmp");

    let result = write_and_rename(&temp_path, path, data);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_rename(temp_path: &Path, path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = open_private(temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(temp_path, path)
}

fn open_private(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    options.mode(0o600);

    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{AuthCache, PushRuleset, UserPreferences};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = SectionStore::new();

        let loaded: Option<AuthCache> = store
            .load_section(&Section::auth_cache(), temp_dir.path())
            .unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("a").join("b");
        let store = SectionStore::new();

        let _: Option<UserPreferences> = store.load_section(&Section::preferences(), &dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = SectionStore::new();
        let cache = AuthCache {
            next_batch: "s72595_4483_1934".to_string(),
            filter_id: "abc123".to_string(),
            initial_sync_done: true,
        };

        store
            .save_section(&Section::auth_cache(), temp_dir.path(), &cache)
            .unwrap();
        assert!(temp_dir.path().join("auth-cache.yaml").exists());
        assert!(!temp_dir.path().join("auth-cache.tmp").exists());

        let loaded: AuthCache = store
            .load_section(&Section::auth_cache(), temp_dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(loaded, cache);
    }

    #[test]
    fn test_push_rules_written_as_json() {
        let temp_dir = TempDir::new().unwrap();
        let store = SectionStore::new();
        let rules = PushRuleset::new(serde_json::json!({"global": {"content": []}})).unwrap();

        store
            .save_section(&Section::push_rules(), temp_dir.path(), &rules)
            .unwrap();

        let raw = fs::read_to_string(temp_dir.path().join("pushrules.json")).unwrap();
        assert_eq!(raw, r#"{"global":{"content":[]}}"#);
    }

    #[test]
    fn test_absent_push_rules_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = SectionStore::new();

        store
            .save_section(&Section::push_rules(), temp_dir.path(), &None::<PushRuleset>)
            .unwrap();
        let raw = fs::read_to_string(temp_dir.path().join("pushrules.json")).unwrap();
        assert_eq!(raw, "null");

        let loaded: Option<Option<PushRuleset>> = store
            .load_section(&Section::push_rules(), temp_dir.path())
            .unwrap();
        assert_eq!(loaded, Some(None));
    }

    #[test]
    fn test_failed_write_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = SectionStore::new();
        // The rename fails when a directory sits at the target path
        fs::create_dir(temp_dir.path().join("auth-cache.yaml")).unwrap();

        let err = store
            .save_section(&Section::auth_cache(), temp_dir.path(), &AuthCache::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileWriteFailed { .. }));
        assert!(!temp_dir.path().join("auth-cache.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_malformed_data() {
        let temp_dir = TempDir::new().unwrap();
        let store = SectionStore::new();
        fs::write(
            temp_dir.path().join("auth-cache.yaml"),
            "next_batch: [unclosed\n",
        )
        .unwrap();

        let err = store
            .load_section::<AuthCache>(&Section::auth_cache(), temp_dir.path())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MalformedData {
                section: "auth cache",
                ..
            }
        ));
    }

    #[test]
    fn test_unreadable_path_is_read_failure() {
        let temp_dir = TempDir::new().unwrap();
        let store = SectionStore::new();
        // A directory where the file should be cannot be read as a file
        fs::create_dir(temp_dir.path().join("preferences.yaml")).unwrap();

        let err = store
            .load_section::<UserPreferences>(&Section::preferences(), temp_dir.path())
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileReadFailed { .. }));
    }

    #[test]
    fn test_directory_blocked_by_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = SectionStore::new();
        let blocker = temp_dir.path().join("cache");
        fs::write(&blocker, "not a directory").unwrap();

        let err = store
            .save_section(&Section::auth_cache(), &blocker, &AuthCache::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::DirectoryCreateFailed { .. }));
    }

    #[test]
    fn test_suppressed_save_leaves_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = SectionStore::new();
        let original = AuthCache {
            filter_id: "before".to_string(),
            ..Default::default()
        };
        store
            .save_section(&Section::auth_cache(), temp_dir.path(), &original)
            .unwrap();

        store.suppress();
        assert!(store.is_suppressed());
        let changed = AuthCache {
            filter_id: "after".to_string(),
            ..Default::default()
        };
        store
            .save_section(&Section::auth_cache(), temp_dir.path(), &changed)
            .unwrap();

        let loaded: AuthCache = store
            .load_section(&Section::auth_cache(), temp_dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(loaded.filter_id, "before");

        store.resume();
        store
            .save_section(&Section::auth_cache(), temp_dir.path(), &changed)
            .unwrap();
        let loaded: AuthCache = store
            .load_section(&Section::auth_cache(), temp_dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(loaded.filter_id, "after");
    }

    #[test]
    fn test_suppressed_save_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("never");
        let mut store = SectionStore::new();
        store.suppress();

        store
            .save_section(&Section::preferences(), &dir, &UserPreferences::default())
            .unwrap();
        assert!(!dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("private");
        let store = SectionStore::new();
        store
            .save_section(&Section::auth_cache(), &dir, &AuthCache::default())
            .unwrap();

        let file_mode = fs::metadata(dir.join("auth-cache.yaml"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(file_mode & 0o777, 0o600);

        let dir_mode = fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o077, 0);
    }
}
