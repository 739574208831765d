//! Translation table for player-facing strings.
//!
//! The host game ships its own localization pipeline; the plugin only needs a
//! small lookup table for the strings it composes itself (hover lines, tile
//! area labels, location names the host doesn't provide). Populated once at
//! startup in the same hard-coded data-layer style the game uses for its
//! registries.

use bevy::prelude::*;
use std::collections::HashMap;

#[derive(Resource, Debug, Clone, Default)]
pub struct Translations {
    strings: HashMap<String, String>,
}

impl Translations {
    /// Look up a key. Falls back to the key itself so a missing translation
    /// shows up on screen as the key instead of an empty string.
    pub fn get(&self, key: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Look up a templated string and substitute `{token}` placeholders.
    pub fn get_with(&self, key: &str, tokens: &[(&str, String)]) -> String {
        let mut text = self.get(key);
        for (token, value) in tokens {
            text = text.replace(&format!("{{{}}}", token), value);
        }
        text
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }
}

/// Populate the translation table with the English strings.
pub fn populate_translations(t: &mut Translations) {
    // Facing direction codes follow the host's sprite rows.
    t.insert("facing_direction_0", "up");
    t.insert("facing_direction_1", "right");
    t.insert("facing_direction_2", "down");
    t.insert("facing_direction_3", "left");

    t.insert("location_hover_text", "X: {x} Y: {y} Facing: {facing}");

    // Tile area labels (referenced by the tile-area data asset).
    t.insert("tile_area.town_square", "Town Square");
    t.insert("tile_area.bakery_counter", "Bakery Counter");
    t.insert("tile_area.beach_pier", "Old Pier");
    t.insert("tile_area.forge_workshop", "Forge Workshop");
    t.insert("tile_area.caravan_stalls", "Caravan Stalls");
    t.insert("tile_area.elena_room", "Elena's Room");
    t.insert("tile_area.sam_room", "Sam's Room");
    t.insert("tile_area.clinic_backroom", "Clinic Back Room");

    // Interiors the host gives no display name.
    t.insert("location_names.CaravanCamp", "Caravan Camp");
    t.insert("location_names.ClinicBackroom", "Clinic Back Room");
    t.insert("location_names.ElenaRoom", "Elena's Room");
    t.insert("location_names.SamRoom", "Sam's Room");
    t.insert("location_names.MineDepths", "Mine Depths");

    // Street addresses shown instead of the host names for villager homes.
    t.insert("address.SamHouse", "3 River Lane");
    t.insert("address.LilyCottage", "1 Petal Court");
    t.insert("address.RexManor", "1 Town Square");
    t.insert("address.NoraFarmhouse", "Sunrise Farm");
}

/// Startup system: fill the `Translations` resource.
pub fn setup_translations(mut translations: ResMut<Translations>) {
    populate_translations(&mut translations);
    info!("Translations loaded.");
}
