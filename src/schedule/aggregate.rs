//! Per-day schedule aggregation and the date-keyed cache.

use bevy::prelude::*;
use std::collections::HashMap;

use super::entry::ScheduleEntry;
use crate::areas::TileAreaCatalog;
use crate::shared::{GameDate, Relationships, Villager, Villagers, MOD_ID, TWIN_INSTANCE_NPC};

/// Hearts required before an access area stops hiding a villager's stops.
pub const ACCESS_HEARTS: u8 = 2;

/// One villager's schedule for the current day.
#[derive(Debug, Clone, PartialEq)]
pub struct NpcSchedule {
    /// Internal villager name (the cache key before disambiguation).
    pub name: String,
    /// Localized name shown in the list.
    pub display_name: String,
    /// Today's stops, always led by the synthetic `time == 0` entry.
    pub entries: Vec<ScheduleEntry>,
    pub can_socialize: bool,
    /// True only if the villager follows a schedule and is not ignoring it
    /// today. When false the entry list should not be trusted.
    pub is_on_schedule: bool,
    /// Set by incremental sync updates on peers whose entry list is stale;
    /// None while the entries themselves are authoritative.
    pub current_location: Option<String>,
}

/// The per-day schedule cache. Valid for exactly one date: any access with a
/// different current date is a miss and triggers recomputation (on the host)
/// or waits for the next broadcast (on clients).
#[derive(Resource, Debug, Clone, Default)]
pub struct ScheduleLedger {
    date: Option<GameDate>,
    schedules: HashMap<String, NpcSchedule>,
}

impl ScheduleLedger {
    pub fn is_fresh(&self, today: GameDate) -> bool {
        self.date == Some(today)
    }

    pub fn date(&self) -> Option<GameDate> {
        self.date
    }

    pub fn schedules(&self) -> &HashMap<String, NpcSchedule> {
        &self.schedules
    }

    /// Walk the villager roster and rebuild the cache for `today`. Cheap to
    /// call repeatedly: a fresh cache returns immediately. Not reentrant;
    /// the exclusive borrow rules out recursive aggregation at compile time.
    pub fn compute(&mut self, today: GameDate, villagers: &Villagers) {
        if self.is_fresh(today) {
            return;
        }
        debug!("Calculating villager schedules for {}.", today);
        self.schedules.clear();

        for villager in &villagers.roster {
            match build_npc_schedule(villager) {
                Ok(Some(schedule)) => self.insert(villager.name.clone(), schedule),
                Ok(None) => {} // no schedule today; not listed at all
                Err(e) => {
                    error!(
                        "Something went wrong while adding {}'s schedule: {}",
                        villager.name, e
                    );
                }
            }
        }

        self.date = Some(today);
    }

    /// Insert under the villager's name, disambiguating duplicates with a
    /// deterministic suffix so no schedule is lost.
    fn insert(&mut self, name: String, schedule: NpcSchedule) {
        if !self.schedules.contains_key(&name) {
            self.schedules.insert(name, schedule);
            return;
        }

        let count = self
            .schedules
            .keys()
            .filter(|key| key.starts_with(&name))
            .count()
            + 1;
        if name != TWIN_INSTANCE_NPC || count != 2 {
            warn!(
                "Found a villager whose name is already listed. {} instances of {} so far; \
                 duplicates may appear in the schedule list.",
                count, name
            );
        }
        self.schedules
            .insert(format!("{}-{}-{}", name, MOD_ID, count), schedule);
    }

    /// Replace the whole cache with a received broadcast.
    pub fn replace(&mut self, date: GameDate, schedules: HashMap<String, NpcSchedule>) {
        self.date = Some(date);
        self.schedules = schedules;
    }

    /// Apply an incremental location update. Unknown keys are dropped with a
    /// warning; an update can legally arrive before the first full sync.
    pub fn update_current_location(&mut self, npc: &str, location: &str) {
        match self.schedules.get_mut(npc) {
            Some(schedule) => schedule.current_location = Some(location.to_string()),
            None => warn!(
                "Could not update the current location for {}: not in the schedule list.",
                npc
            ),
        }
    }

    /// View over the cache with the two optional predicates AND-combined.
    /// "Met" means the friendship table has an entry under the cache key.
    pub fn filtered(
        &self,
        only_met: bool,
        only_socializable: bool,
        relationships: &Relationships,
    ) -> Vec<(&String, &NpcSchedule)> {
        self.schedules
            .iter()
            .filter(|(key, schedule)| {
                (schedule.can_socialize || !only_socializable)
                    && (relationships.has_met(key) || !only_met)
            })
            .collect()
    }
}

/// Build one villager's day. `Ok(None)` means the villager has no schedule
/// today and is excluded from the listing entirely.
fn build_npc_schedule(villager: &Villager) -> Result<Option<NpcSchedule>, String> {
    let steps = match &villager.schedule {
        None => return Ok(None),
        Some(steps) if steps.is_empty() => return Ok(None),
        Some(steps) => steps,
    };

    if villager.name.is_empty() {
        return Err("roster record has an empty name".into());
    }
    if villager.default_map.is_empty() {
        return Err("roster record has no default map".into());
    }

    let mut entries = Vec::with_capacity(steps.len() + 1);
    entries.push(ScheduleEntry::default_position(villager));
    entries.extend(steps.iter().map(ScheduleEntry::from_step));

    Ok(Some(NpcSchedule {
        name: villager.name.clone(),
        display_name: villager.display_name.clone(),
        entries,
        can_socialize: villager.can_socialize,
        is_on_schedule: villager.follows_schedule && !villager.ignores_schedule_today,
        current_location: None,
    }))
}

/// Re-check every entry of one schedule against the access areas naming that
/// villager. Entries inside a matching area are trusted only when the player
/// has at least [`ACCESS_HEARTS`] hearts with any villager the area names;
/// entries no area covers keep the default `can_access = true`.
pub fn update_entries_can_access(
    schedule: &mut NpcSchedule,
    catalog: &TileAreaCatalog,
    relationships: &Relationships,
) {
    let areas: Vec<_> = catalog
        .access
        .iter()
        .filter(|area| area.names_npc(&schedule.name))
        .collect();
    if areas.is_empty() {
        return;
    }

    for entry in &mut schedule.entries {
        let Some(area) = areas.iter().find(|area| area.location == entry.location) else {
            continue;
        };
        if area.contains(entry.x, entry.y) {
            entry.can_access = area
                .npcs
                .as_deref()
                .unwrap_or_default()
                .iter()
                .any(|npc| relationships.hearts(npc) >= ACCESS_HEARTS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{populate_translations, Translations};
    use crate::shared::PathStep;

    fn step(time: u16, tile: (i32, i32), location: &str, facing: u8, anim: Option<&str>) -> PathStep {
        PathStep {
            time,
            target_tile: tile,
            target_location: location.into(),
            facing,
            behavior: anim.map(str::to_string),
        }
    }

    fn villager(name: &str, steps: Option<Vec<PathStep>>) -> Villager {
        Villager {
            name: name.into(),
            display_name: name.into(),
            default_tile: (3, 3),
            default_map: "LilyCottage".into(),
            default_facing: 1,
            can_socialize: true,
            follows_schedule: true,
            ignores_schedule_today: false,
            current_location: "LilyCottage".into(),
            schedule: steps,
        }
    }

    fn lily_day() -> Vec<PathStep> {
        vec![
            step(1200, (10, 20), "Town", 2, None),
            step(1800, (5, 5), "LilyCottage", 0, Some("sit")),
        ]
    }

    fn today() -> GameDate {
        GameDate::default()
    }

    #[test]
    fn test_aggregation_scenario() {
        let villagers = Villagers {
            roster: vec![villager("Lily", Some(lily_day()))],
        };
        let mut ledger = ScheduleLedger::default();
        ledger.compute(today(), &villagers);

        let schedule = &ledger.schedules()["Lily"];
        let got: Vec<_> = schedule
            .entries
            .iter()
            .map(|e| {
                (
                    e.time,
                    e.x,
                    e.y,
                    e.location.as_str(),
                    e.facing,
                    e.animation.as_deref(),
                )
            })
            .collect();
        assert_eq!(
            got,
            vec![
                (0, 3, 3, "LilyCottage", 1, None),
                (1200, 10, 20, "Town", 2, None),
                (1800, 5, 5, "LilyCottage", 0, Some("sit")),
            ]
        );
        assert!(schedule.is_on_schedule);
        assert!(schedule.current_location.is_none());
        assert!(ledger.is_fresh(today()));
    }

    #[test]
    fn test_unscheduled_villagers_are_excluded() {
        let villagers = Villagers {
            roster: vec![
                villager("Lily", Some(lily_day())),
                villager("Doc", None),
                villager("Sam", Some(vec![])),
            ],
        };
        let mut ledger = ScheduleLedger::default();
        ledger.compute(today(), &villagers);

        assert_eq!(ledger.schedules().len(), 1);
        assert!(ledger.schedules().contains_key("Lily"));
    }

    #[test]
    fn test_ignoring_schedule_today_is_listed_but_off_schedule() {
        let mut v = villager("Lily", Some(lily_day()));
        v.ignores_schedule_today = true;
        let villagers = Villagers { roster: vec![v] };
        let mut ledger = ScheduleLedger::default();
        ledger.compute(today(), &villagers);

        assert!(!ledger.schedules()["Lily"].is_on_schedule);
    }

    #[test]
    fn test_duplicate_names_are_both_kept() {
        let mut twin = villager(TWIN_INSTANCE_NPC, Some(lily_day()));
        twin.default_map = "CaravanCamp".into();
        let villagers = Villagers {
            roster: vec![villager(TWIN_INSTANCE_NPC, Some(lily_day())), twin],
        };
        let mut ledger = ScheduleLedger::default();
        ledger.compute(today(), &villagers);

        assert_eq!(ledger.schedules().len(), 2);
        assert!(ledger.schedules().contains_key(TWIN_INSTANCE_NPC));
        let suffixed = format!("{}-{}-2", TWIN_INSTANCE_NPC, MOD_ID);
        assert!(ledger.schedules().contains_key(&suffixed));
        assert_eq!(
            ledger.schedules()[&suffixed].entries[0].location,
            "CaravanCamp"
        );
    }

    #[test]
    fn test_bad_roster_record_does_not_abort_the_pass() {
        let mut broken = villager("Tom", Some(lily_day()));
        broken.default_map = String::new();
        let villagers = Villagers {
            roster: vec![broken, villager("Lily", Some(lily_day()))],
        };
        let mut ledger = ScheduleLedger::default();
        ledger.compute(today(), &villagers);

        assert_eq!(ledger.schedules().len(), 1);
        assert!(ledger.schedules().contains_key("Lily"));
    }

    #[test]
    fn test_fresh_cache_is_not_recomputed() {
        let villagers = Villagers {
            roster: vec![villager("Lily", Some(lily_day()))],
        };
        let mut ledger = ScheduleLedger::default();
        ledger.compute(today(), &villagers);

        // Roster changes mid-day must not be picked up until the date moves.
        let empty = Villagers::default();
        ledger.compute(today(), &empty);
        assert_eq!(ledger.schedules().len(), 1);

        let tomorrow = GameDate::from_day_number(today().day_number() + 1);
        ledger.compute(tomorrow, &empty);
        assert!(ledger.schedules().is_empty());
        assert!(ledger.is_fresh(tomorrow));
    }

    #[test]
    fn test_filters_are_independent_and_intersect() {
        let mut lonely = villager("Doc", Some(lily_day()));
        lonely.can_socialize = false;
        let villagers = Villagers {
            roster: vec![villager("Lily", Some(lily_day())), lonely],
        };
        let mut ledger = ScheduleLedger::default();
        ledger.compute(today(), &villagers);

        let mut rel = Relationships::default();
        rel.friendship.insert("Doc".into(), 30);

        let unfiltered = ledger.filtered(false, false, &rel);
        assert_eq!(unfiltered.len(), 2);

        let met = ledger.filtered(true, false, &rel);
        assert_eq!(met.len(), 1);
        assert_eq!(met[0].0, "Doc");

        let social = ledger.filtered(false, true, &rel);
        assert_eq!(social.len(), 1);
        assert_eq!(social[0].0, "Lily");

        let both = ledger.filtered(true, true, &rel);
        assert!(both.is_empty());
    }

    #[test]
    fn test_location_update_on_missing_key_is_dropped() {
        let mut ledger = ScheduleLedger::default();
        ledger.update_current_location("Zz-Nonexistent", "Town");
        assert!(ledger.schedules().is_empty());
    }

    #[test]
    fn test_access_gating_flips_with_hearts() {
        let mut t = Translations::default();
        populate_translations(&mut t);
        let catalog = TileAreaCatalog::load_from_str(
            r#"{ "lily_stand": {
                "Location": "Town",
                "TileRectangle": { "X": 0, "Y": 0, "Width": 20, "Height": 21 },
                "DisplayName": "Flower Stand",
                "Npcs": ["Lily"]
            } }"#,
            &t,
        );

        let villagers = Villagers {
            roster: vec![villager("Lily", Some(lily_day()))],
        };
        let mut ledger = ScheduleLedger::default();
        ledger.compute(today(), &villagers);
        let mut schedule = ledger.schedules()["Lily"].clone();

        let mut rel = Relationships::default();
        rel.friendship.insert("Lily".into(), 100); // one heart
        update_entries_can_access(&mut schedule, &catalog, &rel);
        assert!(!schedule.entries[1].can_access); // (10, 20) in Town
        assert!(schedule.entries[0].can_access); // cottage stop untouched
        assert!(schedule.entries[2].can_access);

        rel.friendship.insert("Lily".into(), 200); // two hearts
        let mut schedule = ledger.schedules()["Lily"].clone();
        update_entries_can_access(&mut schedule, &catalog, &rel);
        assert!(schedule.entries[1].can_access);
    }
}
