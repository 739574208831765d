//! Named tile regions within game locations.
//!
//! Loaded once at startup from the tile-area data asset and immutable after
//! that. Areas with an `Npcs` list are access areas: they gate how much of
//! that villager's schedule the player can trust at low friendship. The rest
//! are general areas, used only to enrich schedule lines with a place label
//! ("Bakery Counter" instead of bare coordinates).

use bevy::prelude::*;
use serde_json::Value;

use crate::i18n::Translations;

/// Embedded copy of the data asset; parsed once at startup.
pub const TILE_AREAS_ASSET: &str = include_str!("../../assets/tile_areas.json");

/// Key prefix marking a display name that goes through the translation table.
const TRANSLATED_NAME_PREFIX: &str = "tile_area";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl TileRect {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[derive(Debug, Clone)]
pub struct TileArea {
    /// Internal id of the location this area belongs to.
    pub location: String,
    pub rect: Option<TileRect>,
    pub tiles: Option<Vec<(i32, i32)>>,
    pub display_name: String,
    /// Present only on access areas.
    pub npcs: Option<Vec<String>>,
}

impl TileArea {
    /// Rectangle first, explicit tile list second. An area with neither
    /// constraint matches every tile: an access area with no geometry covers
    /// the villager's whole location. Callers must expect that.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let mut inside = None;
        if let Some(rect) = &self.rect {
            inside = Some(rect.contains(x, y));
        }
        if inside != Some(true) {
            if let Some(tiles) = &self.tiles {
                inside = Some(tiles.contains(&(x, y)));
            }
        }
        inside.unwrap_or(true)
    }

    pub fn names_npc(&self, npc: &str) -> bool {
        self.npcs
            .as_deref()
            .is_some_and(|npcs| npcs.iter().any(|n| n == npc))
    }
}

/// Two disjoint catalogs built from the data asset.
#[derive(Resource, Debug, Clone, Default)]
pub struct TileAreaCatalog {
    pub general: Vec<TileArea>,
    pub access: Vec<TileArea>,
}

impl TileAreaCatalog {
    /// Parse a name → definition mapping. A malformed entry is skipped with a
    /// warning; it never aborts the rest of the catalog.
    pub fn load_from_str(raw: &str, translations: &Translations) -> Self {
        let mut catalog = Self::default();

        let root: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!("Tile area asset is not valid JSON: {}", e);
                return catalog;
            }
        };
        let Some(entries) = root.as_object() else {
            warn!("Tile area asset is not a name/definition mapping.");
            return catalog;
        };

        for (name, definition) in entries {
            match parse_area(definition, translations) {
                Ok(area) => {
                    if area.npcs.is_none() {
                        catalog.general.push(area);
                    } else {
                        catalog.access.push(area);
                    }
                }
                Err(e) => warn!("Failed to load tile area \"{}\": {}", name, e),
            }
        }
        catalog
    }

    /// Display name of the first general area containing the tile, or an
    /// empty string when no area matches.
    pub fn general_area_name(&self, location: &str, x: i32, y: i32) -> String {
        self.general
            .iter()
            .find(|area| area.location == location && area.contains(x, y))
            .map(|area| area.display_name.clone())
            .unwrap_or_default()
    }
}

fn parse_area(definition: &Value, translations: &Translations) -> Result<TileArea, String> {
    let location = definition
        .get("Location")
        .and_then(Value::as_str)
        .ok_or("missing Location")?
        .to_string();

    let rect = match definition.get("TileRectangle") {
        None => None,
        Some(tr) => Some(TileRect {
            x: int_field(tr, "X")?,
            y: int_field(tr, "Y")?,
            width: int_field(tr, "Width")?,
            height: int_field(tr, "Height")?,
        }),
    };

    let tiles = match definition.get("Tiles") {
        None => None,
        Some(list) => {
            let list = list.as_array().ok_or("Tiles is not an array")?;
            let mut tiles = Vec::with_capacity(list.len());
            for tile in list {
                tiles.push((int_field(tile, "X")?, int_field(tile, "Y")?));
            }
            Some(tiles)
        }
    };

    let npcs = match definition.get("Npcs") {
        None => None,
        Some(list) => {
            let list = list.as_array().ok_or("Npcs is not an array")?;
            Some(
                list.iter()
                    .map(|npc| {
                        npc.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| "Npcs entry is not a string".to_string())
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }
    };

    let raw_name = definition
        .get("DisplayName")
        .and_then(Value::as_str)
        .ok_or("missing DisplayName")?;
    let display_name = if raw_name.starts_with(TRANSLATED_NAME_PREFIX) {
        translations.get(raw_name)
    } else {
        raw_name.to_string()
    };

    Ok(TileArea {
        location,
        rect,
        tiles,
        display_name,
        npcs,
    })
}

fn int_field(value: &Value, key: &str) -> Result<i32, String> {
    value
        .get(key)
        .and_then(Value::as_i64)
        .map(|n| n as i32)
        .ok_or_else(|| format!("missing or non-integer {}", key))
}

/// Startup system: parse the embedded asset into the catalog resource.
pub fn load_tile_areas(mut catalog: ResMut<TileAreaCatalog>, translations: Res<Translations>) {
    *catalog = TileAreaCatalog::load_from_str(TILE_AREAS_ASSET, &translations);
    info!(
        "Tile areas loaded: {} general, {} access.",
        catalog.general.len(),
        catalog.access.len()
    );
}
