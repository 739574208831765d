//! Shared resources, events, and constants for the almanac plugin.
//!
//! This is the type contract. Every plugin module imports from here, and the
//! host game feeds the host-owned resources (`GameDate`, `Villagers`,
//! `Relationships`, `LocationNames`, `Session`) plus the message-bus events.
//! No plugin module imports from any other module directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// GAME DATE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn index(self) -> u32 {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Fall => 2,
            Season::Winter => 3,
        }
    }

    pub fn from_index(index: u32) -> Self {
        match index % 4 {
            0 => Season::Spring,
            1 => Season::Summer,
            2 => Season::Fall,
            _ => Season::Winter,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        };
        write!(f, "{}", name)
    }
}

/// The current in-game date. Owned and advanced by the host game; the plugin
/// only reads it to key the schedule cache.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameDate {
    pub year: u32,
    pub season: Season,
    pub day: u8, // 1-28
}

impl Default for GameDate {
    fn default() -> Self {
        Self {
            year: 1,
            season: Season::Spring,
            day: 1,
        }
    }
}

impl GameDate {
    /// Total days elapsed since Year 1, Spring 1 (which is day 0).
    pub fn day_number(&self) -> u32 {
        ((self.year - 1) * DAYS_PER_SEASON * SEASONS_PER_YEAR)
            + (self.season.index() * DAYS_PER_SEASON)
            + (self.day as u32 - 1)
    }

    /// Inverse of [`GameDate::day_number`].
    pub fn from_day_number(n: u32) -> Self {
        let days_per_year = DAYS_PER_SEASON * SEASONS_PER_YEAR;
        Self {
            year: n / days_per_year + 1,
            season: Season::from_index(n % days_per_year / DAYS_PER_SEASON),
            day: (n % DAYS_PER_SEASON) as u8 + 1,
        }
    }
}

impl fmt::Display for GameDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, Year {}", self.season, self.day, self.year)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// VILLAGERS — host world snapshot
// ═══════════════════════════════════════════════════════════════════════

/// One stop of a villager's host-computed daily route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathStep {
    /// Game-clock encoding, e.g. 930 = 9:30 AM.
    pub time: u16,
    pub target_tile: (i32, i32),
    pub target_location: String,
    pub facing: u8,
    /// End-of-route behavior, e.g. a sit or sweep animation.
    pub behavior: Option<String>,
}

/// Read-only snapshot of one villager, as exposed by the host game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Villager {
    /// Internal name, unique per instance except for the known twin case.
    pub name: String,
    /// Localized name shown to the player.
    pub display_name: String,
    pub default_tile: (i32, i32),
    pub default_map: String,
    pub default_facing: u8,
    pub can_socialize: bool,
    pub follows_schedule: bool,
    pub ignores_schedule_today: bool,
    pub current_location: String,
    /// Today's route, or None when the host assigned no schedule.
    pub schedule: Option<Vec<PathStep>>,
}

/// The host's villager roster. Refreshed by the host each day.
#[derive(Resource, Debug, Clone, Default)]
pub struct Villagers {
    pub roster: Vec<Villager>,
}

// ═══════════════════════════════════════════════════════════════════════
// RELATIONSHIPS
// ═══════════════════════════════════════════════════════════════════════

pub const FRIENDSHIP_PER_HEART: u32 = 100;
pub const MAX_HEARTS: u32 = 10;

/// Friendship points per NPC, tracked by the host. An NPC with no entry has
/// never been met.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relationships {
    pub friendship: HashMap<String, u32>,
}

impl Relationships {
    pub fn points(&self, npc: &str) -> u32 {
        self.friendship.get(npc).copied().unwrap_or(0)
    }

    pub fn hearts(&self, npc: &str) -> u8 {
        (self.points(npc) / FRIENDSHIP_PER_HEART).min(MAX_HEARTS) as u8
    }

    pub fn has_met(&self, npc: &str) -> bool {
        self.friendship.contains_key(npc)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LOCATIONS & SESSION
// ═══════════════════════════════════════════════════════════════════════

/// Host-provided display names keyed by internal location id. Locations
/// missing here have no host display name.
#[derive(Resource, Debug, Clone, Default)]
pub struct LocationNames {
    pub names: HashMap<String, String>,
}

/// Multiplayer role. The host is authoritative for schedule computation;
/// clients only consume broadcasts. Single-player counts as host.
#[derive(Resource, Debug, Clone)]
pub struct Session {
    pub is_host: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self { is_host: true }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — host hooks and the message bus
// ═══════════════════════════════════════════════════════════════════════

/// Fired by the host when the in-game day rolls over.
#[derive(Event, Debug, Clone)]
pub struct DayEndEvent {
    pub day: u8,
    pub season: Season,
    pub year: u32,
}

/// Outbound broadcast on the host's message bus. Fire-and-forget: no acks,
/// no retries; a dropped message leaves peers stale until the next publish.
#[derive(Event, Debug, Clone)]
pub struct ModMessageSent {
    pub channel: &'static str,
    pub payload: String,
}

/// Inbound message delivered by the host's message bus.
#[derive(Event, Debug, Clone)]
pub struct ModMessageReceived {
    pub channel: String,
    pub payload: String,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const MOD_ID: &str = "almanac";

/// Message-bus channel for all almanac traffic.
pub const SCHEDULE_CHANNEL: &str = "almanac/schedules";

/// Host pixels per tile; wire positions are in pixels.
pub const TILE_PIXELS: i32 = 64;

pub const DAYS_PER_SEASON: u32 = 28;
pub const SEASONS_PER_YEAR: u32 = 4;

/// The one villager the host legitimately instantiates twice: the traveling
/// merchant exists once at her town stall and once at the caravan camp.
pub const TWIN_INSTANCE_NPC: &str = "Mira";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_number_round_trip() {
        let date = GameDate {
            year: 2,
            season: Season::Fall,
            day: 17,
        };
        assert_eq!(GameDate::from_day_number(date.day_number()), date);
    }

    #[test]
    fn test_day_number_origin() {
        assert_eq!(GameDate::default().day_number(), 0);
        assert_eq!(GameDate::from_day_number(0), GameDate::default());
    }

    #[test]
    fn test_day_number_season_boundaries() {
        let last_spring = GameDate {
            year: 1,
            season: Season::Spring,
            day: 28,
        };
        let first_summer = GameDate {
            year: 1,
            season: Season::Summer,
            day: 1,
        };
        assert_eq!(last_spring.day_number() + 1, first_summer.day_number());
    }

    #[test]
    fn test_hearts_from_points() {
        let mut rel = Relationships::default();
        rel.friendship.insert("Lily".into(), 250);
        assert_eq!(rel.hearts("Lily"), 2);
        assert_eq!(rel.hearts("Sam"), 0);
        assert!(rel.has_met("Lily"));
        assert!(!rel.has_met("Sam"));
    }
}
