//! Storage layer
//!
//! Section files are loaded and saved through [`SectionStore`], which owns
//! the save-suppression flag. Errors for every storage operation live in
//! [`error`].

pub mod error;
pub mod section_store;

pub use error::{ConfigError, ConfigResult};
pub use section_store::{ensure_dir, SectionStore};
