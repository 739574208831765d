//! Filtered, sorted projection of the schedule cache for the list menu.
//!
//! Everything here is a pure read: the cache is never mutated, and the
//! display strings are composed on demand instead of being memoized on the
//! records.

use serde::{Deserialize, Serialize};

use crate::areas::TileAreaCatalog;
use crate::config::AlmanacConfig;
use crate::i18n::Translations;
use crate::locations::{self, CustomLocationFeed};
use crate::schedule::aggregate::{NpcSchedule, ScheduleLedger};
use crate::schedule::entry::{format_time_of_day, ScheduleEntry};
use crate::shared::{LocationNames, Relationships};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOrder {
    #[default]
    AlphabeticalAscending,
    AlphabeticalDescending,
    HeartsAscending,
    HeartsDescending,
}

/// Produce the rows the menu lists, in display order. Applies the config's
/// met/socializable filters, drops villagers on the exclusion list, then
/// sorts. Friendship sorts use raw points (finer than hearts) with the
/// display name as tie-break; `sort_by` keeps equal rows in a stable order.
pub fn sorted_schedules<'a>(
    ledger: &'a ScheduleLedger,
    config: &AlmanacConfig,
    relationships: &Relationships,
) -> Vec<(&'a String, &'a NpcSchedule)> {
    let mut rows = ledger.filtered(
        config.only_show_met_npcs,
        config.only_show_socializable_npcs,
        relationships,
    );
    rows.retain(|(_, schedule)| !config.excluded_npcs.iter().any(|n| n == &schedule.name));

    match config.sort_order {
        SortOrder::AlphabeticalAscending => {
            rows.sort_by(|a, b| a.1.display_name.cmp(&b.1.display_name));
        }
        SortOrder::AlphabeticalDescending => {
            rows.sort_by(|a, b| b.1.display_name.cmp(&a.1.display_name));
        }
        SortOrder::HeartsAscending => {
            rows.sort_by(|a, b| {
                relationships
                    .points(a.0)
                    .cmp(&relationships.points(b.0))
                    .then_with(|| a.1.display_name.cmp(&b.1.display_name))
            });
        }
        SortOrder::HeartsDescending => {
            rows.sort_by(|a, b| {
                relationships
                    .points(b.0)
                    .cmp(&relationships.points(a.0))
                    .then_with(|| a.1.display_name.cmp(&b.1.display_name))
            });
        }
    }
    rows
}

/// Read-only bundle of everything needed to turn entries into text. The menu
/// borrows its resources into one of these per frame and queries it per line.
pub struct DisplayCtx<'a> {
    pub config: &'a AlmanacConfig,
    pub translations: &'a Translations,
    pub catalog: &'a TileAreaCatalog,
    pub feed: &'a CustomLocationFeed,
    pub host_names: &'a LocationNames,
}

impl DisplayCtx<'_> {
    pub fn location_name(&self, id: &str) -> String {
        locations::resolve(
            id,
            self.config.use_address_names,
            self.translations,
            self.feed,
            self.host_names,
        )
    }

    /// One list line: "9:30 AM Town Square (Bakery Counter)". The tile-area
    /// suffix is omitted when no general area covers the stop.
    pub fn entry_label(&self, entry: &ScheduleEntry) -> String {
        let time = format_time_of_day(entry.display_time());
        let location = self.location_name(&entry.location);
        let area = self
            .catalog
            .general_area_name(&entry.location, entry.x, entry.y);
        if area.is_empty() {
            format!("{} {}", time, location)
        } else {
            format!("{} {} ({})", time, location, area)
        }
    }

    /// Tooltip for one entry: coordinates and facing, plus the animation
    /// name when the stop has one. Empty when tooltips are disabled.
    pub fn entry_hover_text(&self, entry: &ScheduleEntry) -> String {
        if self.config.disable_hover {
            return String::new();
        }
        let facing = self
            .translations
            .get(&format!("facing_direction_{}", entry.facing));
        let mut lines = vec![self.translations.get_with(
            "location_hover_text",
            &[
                ("x", entry.x.to_string()),
                ("y", entry.y.to_string()),
                ("facing", facing),
            ],
        )];
        if let Some(animation) = &entry.animation {
            lines.push(animation.clone());
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::populate_translations;
    use crate::shared::{GameDate, PathStep, Villager, Villagers};

    fn villager(name: &str, display: &str) -> Villager {
        Villager {
            name: name.into(),
            display_name: display.into(),
            default_tile: (1, 1),
            default_map: "Town".into(),
            default_facing: 2,
            can_socialize: true,
            follows_schedule: true,
            ignores_schedule_today: false,
            current_location: "Town".into(),
            schedule: Some(vec![PathStep {
                time: 900,
                target_tile: (20, 14),
                target_location: "Town".into(),
                facing: 2,
                behavior: None,
            }]),
        }
    }

    fn ledger_with(names: &[(&str, &str)]) -> ScheduleLedger {
        let villagers = Villagers {
            roster: names.iter().map(|(n, d)| villager(n, d)).collect(),
        };
        let mut ledger = ScheduleLedger::default();
        ledger.compute(GameDate::default(), &villagers);
        ledger
    }

    fn display_names(rows: &[(&String, &NpcSchedule)]) -> Vec<String> {
        rows.iter().map(|(_, s)| s.display_name.clone()).collect()
    }

    #[test]
    fn test_alphabetical_sort_is_reversible() {
        let ledger = ledger_with(&[("Mira", "Mira"), ("Elena", "Elena"), ("Sam", "Sam")]);
        let rel = Relationships::default();

        let mut config = AlmanacConfig::default();
        config.only_show_socializable_npcs = false;
        config.sort_order = SortOrder::AlphabeticalAscending;
        let ascending = display_names(&sorted_schedules(&ledger, &config, &rel));
        assert_eq!(ascending, vec!["Elena", "Mira", "Sam"]);

        config.sort_order = SortOrder::AlphabeticalDescending;
        let mut descending = display_names(&sorted_schedules(&ledger, &config, &rel));
        descending.reverse();
        assert_eq!(ascending, descending);
    }

    #[test]
    fn test_hearts_sort_breaks_ties_by_name() {
        let ledger = ledger_with(&[("Mira", "Mira"), ("Elena", "Elena"), ("Sam", "Sam")]);
        let mut rel = Relationships::default();
        rel.friendship.insert("Mira".into(), 400);
        rel.friendship.insert("Elena".into(), 150);
        rel.friendship.insert("Sam".into(), 150);

        let mut config = AlmanacConfig::default();
        config.only_show_socializable_npcs = false;
        config.sort_order = SortOrder::HeartsAscending;
        assert_eq!(
            display_names(&sorted_schedules(&ledger, &config, &rel)),
            vec!["Elena", "Sam", "Mira"]
        );

        config.sort_order = SortOrder::HeartsDescending;
        assert_eq!(
            display_names(&sorted_schedules(&ledger, &config, &rel)),
            vec!["Mira", "Elena", "Sam"]
        );
    }

    #[test]
    fn test_exclusion_list_drops_rows() {
        let ledger = ledger_with(&[("Mira", "Mira"), ("Elena", "Elena")]);
        let rel = Relationships::default();
        let mut config = AlmanacConfig::default();
        config.only_show_socializable_npcs = false;
        config.excluded_npcs = vec!["Mira".into()];

        assert_eq!(
            display_names(&sorted_schedules(&ledger, &config, &rel)),
            vec!["Elena"]
        );
    }

    #[test]
    fn test_sorting_does_not_mutate_the_cache() {
        let ledger = ledger_with(&[("Mira", "Mira"), ("Elena", "Elena")]);
        let before = ledger.schedules().clone();
        let rel = Relationships::default();
        let mut config = AlmanacConfig::default();
        config.only_show_socializable_npcs = false;
        config.sort_order = SortOrder::HeartsDescending;
        let _ = sorted_schedules(&ledger, &config, &rel);
        assert_eq!(*ledger.schedules(), before);
    }

    #[test]
    fn test_entry_label_composition() {
        let mut translations = Translations::default();
        populate_translations(&mut translations);
        let catalog =
            TileAreaCatalog::load_from_str(crate::areas::TILE_AREAS_ASSET, &translations);
        let mut host_names = LocationNames::default();
        host_names.names.insert("Town".into(), "Town".into());
        let config = AlmanacConfig::default();
        let feed = CustomLocationFeed::Absent;
        let ctx = DisplayCtx {
            config: &config,
            translations: &translations,
            catalog: &catalog,
            feed: &feed,
            host_names: &host_names,
        };

        let in_square = ScheduleEntry::from_wire(900, (20 * 64, 14 * 64), 2, "Town".into(), None);
        assert_eq!(ctx.entry_label(&in_square), "9:00 AM Town (Town Square)");

        // Sentinel entry renders at day start, no area suffix.
        let outside = ScheduleEntry::from_wire(0, (0, 0), 2, "Town".into(), None);
        assert_eq!(ctx.entry_label(&outside), "6:00 AM Town");
    }

    #[test]
    fn test_entry_hover_text() {
        let mut translations = Translations::default();
        populate_translations(&mut translations);
        let catalog = TileAreaCatalog::default();
        let host_names = LocationNames::default();
        let mut config = AlmanacConfig::default();
        let feed = CustomLocationFeed::Absent;

        let entry =
            ScheduleEntry::from_wire(1800, (5 * 64, 5 * 64), 0, "LilyCottage".into(), Some("sit".into()));
        let ctx = DisplayCtx {
            config: &config,
            translations: &translations,
            catalog: &catalog,
            feed: &feed,
            host_names: &host_names,
        };
        assert_eq!(ctx.entry_hover_text(&entry), "X: 5 Y: 5 Facing: up\nsit");

        config.disable_hover = true;
        let ctx = DisplayCtx {
            config: &config,
            translations: &translations,
            catalog: &catalog,
            feed: &feed,
            host_names: &host_names,
        };
        assert_eq!(ctx.entry_hover_text(&entry), "");
    }
}
