//! Show command handler

use anyhow::{Context, Result};

use parlor_core::Config;

use crate::output::{or_unset, redact, Output};

/// Load every section and print a summary of the stored session
pub fn show(config: &mut Config, output: &Output) -> Result<()> {
    config.load_all().context("Failed to load configuration")?;
    config.load_keymap().context("Failed to load keymap")?;

    let settings = &config.settings;
    let auth = &config.auth_cache;
    let bindings = config.keymap.bindings();

    output.document(
        serde_json::json!({
            "user_id": settings.user_id,
            "device_id": settings.device_id,
            "homeserver": settings.server,
            "logged_in": settings.has_session(),
            "room_cache_size": settings.room_cache_size,
            "room_cache_age": settings.room_cache_age,
            "notify_sound": settings.notify_sound,
            "send_to_verified_only": settings.send_to_verified_only,
            "keymap": settings.keymap,
            "key_bindings": bindings,
            "initial_sync_done": auth.initial_sync_done,
            "filter_id": auth.filter_id,
            "push_rules_cached": config.push_rules.is_some(),
            "preferences": config.preferences,
        }),
        || {
            println!("Session:");
            println!("  user:         {}", or_unset(&settings.user_id));
            println!("  device:       {}", or_unset(&settings.device_id));
            println!("  homeserver:   {}", or_unset(&settings.server));
            println!("  access token: {}", redact(&settings.access_token));
            println!();
            println!("Sync:");
            println!("  initial sync: {}", auth.initial_sync_done);
            println!("  filter:       {}", or_unset(&auth.filter_id));
            println!(
                "  push rules:   {}",
                if config.push_rules.is_some() {
                    "cached"
                } else {
                    "not cached"
                }
            );
            println!();
            println!("Settings:");
            println!(
                "  room cache:   {} rooms, {}s",
                settings.room_cache_size, settings.room_cache_age
            );
            println!("  notify sound: {}", settings.notify_sound);
            println!("  verified only: {}", settings.send_to_verified_only);
            println!("  keymap:       {} ({} bindings)", settings.keymap, bindings.len());
        },
    );

    Ok(())
}
