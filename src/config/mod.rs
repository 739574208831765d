//! Player configuration, persisted as JSON next to the executable.
//!
//! Read once at startup; the settings menu (not part of this crate) writes it
//! back through [`save_config`]. A missing file means defaults; a malformed
//! file is logged and replaced by defaults rather than stopping the plugin.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use crate::view::SortOrder;

pub const CONFIG_FILE: &str = "almanac.json";

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlmanacConfig {
    /// Key that toggles the schedule menu.
    pub show_schedules_key: KeyCode,
    /// Disable tooltips over schedule lines.
    pub disable_hover: bool,
    pub sort_order: SortOrder,
    pub only_show_met_npcs: bool,
    pub only_show_socializable_npcs: bool,
    /// Villagers (by internal name) never shown in the list.
    pub excluded_npcs: Vec<String>,
    /// Show street addresses instead of the host names for villager homes.
    pub use_address_names: bool,
    /// Larger font for the schedule detail lines.
    pub large_font: bool,
}

impl Default for AlmanacConfig {
    fn default() -> Self {
        Self {
            show_schedules_key: KeyCode::KeyV,
            disable_hover: false,
            sort_order: SortOrder::default(),
            only_show_met_npcs: false,
            only_show_socializable_npcs: true,
            excluded_npcs: Vec::new(),
            use_address_names: true,
            large_font: false,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn config_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    exe_dir.join(CONFIG_FILE)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_config() -> AlmanacConfig {
    let path = config_path();
    if !path.exists() {
        return AlmanacConfig::default();
    }
    match fs::read_to_string(&path) {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Could not parse {}: {}. Using default settings.",
                    path.display(),
                    e
                );
                AlmanacConfig::default()
            }
        },
        Err(e) => {
            warn!(
                "Could not read {}: {}. Using default settings.",
                path.display(),
                e
            );
            AlmanacConfig::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn load_config() -> AlmanacConfig {
    AlmanacConfig::default()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_config(config: &AlmanacConfig) -> Result<(), String> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Serialization failed: {}", e))?;
    let path = config_path();
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json)
        .map_err(|e| format!("Write failed for {}: {}", tmp_path.display(), e))?;
    fs::rename(&tmp_path, &path).map_err(|e| format!("Rename failed: {}", e))?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn save_config(_config: &AlmanacConfig) -> Result<(), String> {
    Ok(())
}

/// Startup system: replace the default-initialized resource with the file's
/// contents.
pub fn load_config_into(mut config: ResMut<AlmanacConfig>) {
    *config = load_config();
    info!("Config loaded.");
}
