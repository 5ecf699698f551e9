//! Session maintenance command handlers

use anyhow::{Context, Result};

use parlor_core::Config;

use crate::output::Output;

/// Create the directories and write default settings where none exist
pub fn init(config: &mut Config, output: &Output) -> Result<()> {
    config.load().context("Failed to load configuration")?;
    config
        .load_preferences()
        .context("Failed to load preferences")?;

    config.save().context("Failed to save configuration")?;
    config
        .save_preferences()
        .context("Failed to save preferences")?;

    output.success(&format!(
        "Initialized configuration in {}",
        config.paths().config_dir.display()
    ));
    Ok(())
}

/// Forget the stored login session
pub fn logout(config: &mut Config, output: &Output) -> Result<()> {
    config.load_all().context("Failed to load configuration")?;
    config.delete_session().context("Failed to delete session")?;
    config.save().context("Failed to save configuration")?;

    output.success("Session deleted");
    Ok(())
}

/// Remove cached session state and history
pub fn clear(config: &mut Config, output: &Output) -> Result<()> {
    config.clear();
    output.success(&format!(
        "Cleared cache in {}",
        config.paths().cache_dir.display()
    ));
    Ok(())
}

/// Remove persistent session data
pub fn clear_data(config: &Config, output: &Output) -> Result<()> {
    config.clear_data();
    output.success(&format!(
        "Cleared data in {}",
        config.paths().data_dir.display()
    ));
    Ok(())
}
