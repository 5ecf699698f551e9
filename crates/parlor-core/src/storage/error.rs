//! Section storage errors
//!
//! Every failure of a section load or save carries the section label and the
//! path involved so the caller can report exactly what went wrong.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::room_cache::RoomCacheError;

/// Errors that can occur while loading or saving configuration sections
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to create a section or cache directory
    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A section file exists but could not be read
    #[error("Failed to read {section} from '{path}': {source}")]
    FileReadFailed {
        section: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A section file could not be decoded in its declared format
    #[error("Failed to parse {section} at '{path}': {details}")]
    MalformedData {
        section: &'static str,
        path: PathBuf,
        details: String,
    },

    /// A section value could not be encoded
    #[error("Failed to encode {section}: {details}")]
    EncodeFailed {
        section: &'static str,
        details: String,
    },

    /// A section file could not be written
    #[error("Failed to write {section} to '{path}': {source}")]
    FileWriteFailed {
        section: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The operation is part of the store contract but never supported here
    #[error("{operation} is not supported")]
    UnsupportedOperation { operation: &'static str },

    /// The room cache failed to load or save its room list
    #[error("Room cache error: {0}")]
    RoomCache(#[from] RoomCacheError),
}

impl ConfigError {
    /// The label of the section this error belongs to, if any
    pub fn section(&self) -> Option<&'static str> {
        match self {
            ConfigError::FileReadFailed { section, .. }
            | ConfigError::MalformedData { section, .. }
            | ConfigError::EncodeFailed { section, .. }
            | ConfigError::FileWriteFailed { section, .. } => Some(section),
            _ => None,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            ConfigError::DirectoryCreateFailed { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            ConfigError::FileReadFailed { .. } | ConfigError::FileWriteFailed { .. } => {
                Some("Check file permissions and free disk space.")
            }
            ConfigError::MalformedData { .. } => {
                Some("Fix or remove the file; a missing file is replaced with defaults.")
            }
            ConfigError::RoomCache(_) => {
                Some("Run `parlor clear` to discard the room cache and start fresh.")
            }
            _ => None,
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
