//! Display-name resolution for internal location ids.
//!
//! Resolution order: manual overrides (street addresses for villager homes,
//! local translations for interiors the host never names), then the optional
//! companion map mod's tooltip names, then the host's own display names, and
//! finally the raw id. Resolution never fails.

use bevy::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use crate::i18n::Translations;
use crate::shared::LocationNames;

/// Relative path (next to the executable) probed for the companion map mod's
/// location data.
pub const LOCATION_FEED_FILE: &str = "mods/wayfinder_locations.json";

/// State of the optional location-name feed. Absent and malformed both
/// degrade to default resolution; keeping them distinct makes each outcome
/// testable on its own.
#[derive(Resource, Debug, Clone, Default)]
pub enum CustomLocationFeed {
    #[default]
    Absent,
    Present(HashMap<String, String>),
    Malformed,
}

impl CustomLocationFeed {
    /// Parse the feed's `location id → { MapTooltip: { PrimaryText } }`
    /// mapping, keeping only entries that carry a primary text.
    pub fn from_str(raw: &str) -> Self {
        let root: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(_) => return CustomLocationFeed::Malformed,
        };
        let Some(entries) = root.as_object() else {
            return CustomLocationFeed::Malformed;
        };

        let names: HashMap<String, String> = entries
            .iter()
            .filter_map(|(id, value)| {
                value
                    .pointer("/MapTooltip/PrimaryText")
                    .and_then(Value::as_str)
                    .map(|text| (id.clone(), text.to_string()))
            })
            .collect();
        CustomLocationFeed::Present(names)
    }

    fn get(&self, id: &str) -> Option<&String> {
        match self {
            CustomLocationFeed::Present(names) => names.get(id),
            _ => None,
        }
    }
}

/// Resolve an internal location id to its display string. Never fails.
pub fn resolve(
    id: &str,
    use_address_names: bool,
    translations: &Translations,
    feed: &CustomLocationFeed,
    host_names: &LocationNames,
) -> String {
    if let Some(name) = override_name(id, use_address_names, translations) {
        return name;
    }
    if let Some(name) = feed.get(id) {
        return name.clone();
    }
    if let Some(name) = host_names.names.get(id) {
        return name.clone();
    }
    id.to_string()
}

fn override_name(id: &str, use_address_names: bool, t: &Translations) -> Option<String> {
    if use_address_names {
        // Homes whose host name is replaced by the street address.
        match id {
            "SamHouse" | "LilyCottage" | "RexManor" | "NoraFarmhouse" => {
                return Some(t.get(&format!("address.{}", id)));
            }
            _ => {}
        }
    }
    // Interiors without a host-provided display name.
    match id {
        "CaravanCamp" | "ClinicBackroom" | "ElenaRoom" | "SamRoom" | "MineDepths" => {
            Some(t.get(&format!("location_names.{}", id)))
        }
        _ => None,
    }
}

/// Startup system: probe for the companion map mod's data file.
pub fn probe_location_feed(mut feed: ResMut<CustomLocationFeed>) {
    *feed = load_location_feed();
    match *feed {
        CustomLocationFeed::Present(ref names) => {
            info!("Custom location names loaded: {} entries.", names.len())
        }
        CustomLocationFeed::Absent => {}
        CustomLocationFeed::Malformed => {
            debug!("Custom location name feed present but malformed; ignoring.")
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_location_feed() -> CustomLocationFeed {
    let path = feed_path();
    if !path.exists() {
        return CustomLocationFeed::Absent;
    }
    match std::fs::read_to_string(&path) {
        Ok(raw) => CustomLocationFeed::from_str(&raw),
        Err(_) => CustomLocationFeed::Malformed,
    }
}

#[cfg(target_arch = "wasm32")]
fn load_location_feed() -> CustomLocationFeed {
    CustomLocationFeed::Absent
}

#[cfg(not(target_arch = "wasm32"))]
fn feed_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    exe_dir.join(LOCATION_FEED_FILE)
}
