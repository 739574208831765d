//! One scheduled stop for a villager on the current day.

use crate::shared::{PathStep, Villager, TILE_PIXELS};

/// The game clock value a sentinel `time == 0` entry displays as.
pub const DAY_START_TIME: u16 = 600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Game-clock encoding (930 = 9:30 AM). `0` is a sentinel for the
    /// villager's default starting position, not midnight.
    pub time: u16,
    pub x: i32,
    pub y: i32,
    /// Internal (non-localized) location id.
    pub location: String,
    pub facing: u8,
    pub animation: Option<String>,
    /// Whether the player's friendship is high enough to trust this stop.
    /// Defaults to true; only the access-gating pass changes it.
    pub can_access: bool,
}

impl ScheduleEntry {
    /// Build from one of the host's pathing steps (already in tile coords).
    pub fn from_step(step: &PathStep) -> Self {
        Self {
            time: step.time,
            x: step.target_tile.0,
            y: step.target_tile.1,
            location: step.target_location.clone(),
            facing: step.facing,
            animation: step.behavior.clone(),
            can_access: true,
        }
    }

    /// The synthetic first entry: where the villager starts the day.
    pub fn default_position(villager: &Villager) -> Self {
        Self {
            time: 0,
            x: villager.default_tile.0,
            y: villager.default_tile.1,
            location: villager.default_map.clone(),
            facing: villager.default_facing,
            animation: None,
            can_access: true,
        }
    }

    /// Build from the wire form, which carries the position in pixels.
    pub fn from_wire(
        time: u16,
        position: (i32, i32),
        facing: u8,
        location: String,
        animation: Option<String>,
    ) -> Self {
        Self {
            time,
            x: position.0 / TILE_PIXELS,
            y: position.1 / TILE_PIXELS,
            location,
            facing,
            animation,
            can_access: true,
        }
    }

    /// Pixel position for the wire form.
    pub fn pixel_position(&self) -> (i32, i32) {
        (self.x * TILE_PIXELS, self.y * TILE_PIXELS)
    }

    /// The clock value this entry displays as: default-position entries show
    /// as the start of the day.
    pub fn display_time(&self) -> u16 {
        if self.time == 0 {
            DAY_START_TIME
        } else {
            self.time
        }
    }
}

/// Format a game-clock value the way the host renders its clock:
/// 930 → "9:30 AM", 1300 → "1:00 PM", 2600 → "2:00 AM".
pub fn format_time_of_day(time: u16) -> String {
    let hour = time / 100;
    let minute = time % 100;
    let clock_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    let suffix = if hour < 12 || hour >= 24 { "AM" } else { "PM" };
    format!("{}:{:02} {}", clock_hour, minute, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_of_day() {
        assert_eq!(format_time_of_day(600), "6:00 AM");
        assert_eq!(format_time_of_day(930), "9:30 AM");
        assert_eq!(format_time_of_day(1200), "12:00 PM");
        assert_eq!(format_time_of_day(1310), "1:10 PM");
        assert_eq!(format_time_of_day(2400), "12:00 AM");
        assert_eq!(format_time_of_day(2600), "2:00 AM");
    }

    #[test]
    fn test_from_wire_converts_pixels_to_tiles() {
        let entry = ScheduleEntry::from_wire(1200, (640, 1297), 2, "Town".into(), None);
        assert_eq!((entry.x, entry.y), (10, 20)); // 1297 / 64 truncates to 20
        assert!(entry.can_access);
    }

    #[test]
    fn test_pixel_position_round_trip() {
        let entry = ScheduleEntry::from_wire(900, (320, 448), 1, "Beach".into(), None);
        let again = ScheduleEntry::from_wire(
            entry.time,
            entry.pixel_position(),
            entry.facing,
            entry.location.clone(),
            entry.animation.clone(),
        );
        assert_eq!(entry, again);
    }

    #[test]
    fn test_display_time_sentinel() {
        let step = PathStep {
            time: 0,
            target_tile: (3, 3),
            target_location: "LilyCottage".into(),
            facing: 1,
            behavior: None,
        };
        let entry = ScheduleEntry::from_step(&step);
        assert_eq!(entry.display_time(), DAY_START_TIME);
    }
}
