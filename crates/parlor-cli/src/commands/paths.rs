//! Paths command handler

use anyhow::Result;

use parlor_core::Config;

use crate::output::Output;

/// Print the directory layout derived from the roots
pub fn show(config: &Config, output: &Output) -> Result<()> {
    let paths = config.paths();

    output.document(
        serde_json::json!({
            "config_dir": paths.config_dir,
            "data_dir": paths.data_dir,
            "cache_dir": paths.cache_dir,
            "download_dir": paths.download_dir,
            "state_dir": paths.state_dir,
            "media_dir": paths.media_dir,
            "keymap_dir": paths.keymap_dir,
            "history_path": paths.history_path,
            "room_list_path": paths.room_list_path,
        }),
        || {
            println!("Paths:");
            println!("  config:    {}", paths.config_dir.display());
            println!("  keymaps:   {}", paths.keymap_dir.display());
            println!("  data:      {}", paths.data_dir.display());
            println!("  cache:     {}", paths.cache_dir.display());
            println!("  state:     {}", paths.state_dir.display());
            println!("  media:     {}", paths.media_dir.display());
            println!("  downloads: {}", paths.download_dir.display());
            println!("  history:   {}", paths.history_path.display());
            println!("  room list: {}", paths.room_list_path.display());
        },
    );

    Ok(())
}
