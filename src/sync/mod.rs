//! Schedule distribution over the host's message bus.
//!
//! The host broadcasts the full aggregated set once per day (at day end, for
//! the upcoming day) and pushes incremental current-location updates as
//! villagers move between maps. Clients replace their cache wholesale on the
//! full broadcast and never compute schedules themselves. Everything is
//! fire-and-forget: a lost message just leaves a peer stale until the next
//! day's publish.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::AlmanacConfig;
use crate::locations::{self, CustomLocationFeed};
use crate::i18n::Translations;
use crate::schedule::aggregate::{NpcSchedule, ScheduleLedger};
use crate::schedule::entry::ScheduleEntry;
use crate::shared::*;

/// Bumped whenever the wire format changes incompatibly. Messages from a
/// different version are dropped, not guessed at.
pub const SYNC_PROTOCOL_VERSION: u32 = 1;

// ═══════════════════════════════════════════════════════════════════════
// WIRE FORMAT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SyncEnvelope {
    version: u32,
    message: SyncMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SyncMessage {
    /// The full schedule set, tagged with the day index it is valid for.
    ScheduleSet {
        day_number: u32,
        schedules: HashMap<String, WireNpcSchedule>,
    },
    /// One villager moved; `location` is already a display name.
    LocationUpdate { npc: String, location: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireNpcSchedule {
    pub name: String,
    pub display_name: String,
    pub entries: Vec<WireScheduleEntry>,
    pub can_socialize: bool,
    pub is_on_schedule: bool,
    pub current_location: Option<String>,
}

/// Wire entries carry the position in pixels, matching the host's entity
/// coordinates; tile coordinates are recomputed on decode. `can_access`
/// never crosses the wire: each peer gates with its own friendship data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireScheduleEntry {
    pub time: u16,
    pub position: (i32, i32),
    pub facing_direction: u8,
    pub location: String,
    pub animation: Option<String>,
}

impl From<&ScheduleEntry> for WireScheduleEntry {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            time: entry.time,
            position: entry.pixel_position(),
            facing_direction: entry.facing,
            location: entry.location.clone(),
            animation: entry.animation.clone(),
        }
    }
}

impl From<&NpcSchedule> for WireNpcSchedule {
    fn from(schedule: &NpcSchedule) -> Self {
        Self {
            name: schedule.name.clone(),
            display_name: schedule.display_name.clone(),
            entries: schedule.entries.iter().map(Into::into).collect(),
            can_socialize: schedule.can_socialize,
            is_on_schedule: schedule.is_on_schedule,
            current_location: schedule.current_location.clone(),
        }
    }
}

impl WireNpcSchedule {
    pub fn into_schedule(self) -> NpcSchedule {
        NpcSchedule {
            name: self.name,
            display_name: self.display_name,
            entries: self
                .entries
                .into_iter()
                .map(|e| {
                    ScheduleEntry::from_wire(
                        e.time,
                        e.position,
                        e.facing_direction,
                        e.location,
                        e.animation,
                    )
                })
                .collect(),
            can_socialize: self.can_socialize,
            is_on_schedule: self.is_on_schedule,
            current_location: self.current_location,
        }
    }
}

pub fn encode(message: SyncMessage) -> Result<String, String> {
    serde_json::to_string(&SyncEnvelope {
        version: SYNC_PROTOCOL_VERSION,
        message,
    })
    .map_err(|e| format!("encode failed: {}", e))
}

pub fn decode(payload: &str) -> Result<SyncMessage, String> {
    let envelope: SyncEnvelope =
        serde_json::from_str(payload).map_err(|e| format!("decode failed: {}", e))?;
    if envelope.version != SYNC_PROTOCOL_VERSION {
        return Err(format!(
            "protocol version {} (expected {})",
            envelope.version, SYNC_PROTOCOL_VERSION
        ));
    }
    Ok(envelope.message)
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// Last current-location broadcast per villager, for change detection.
#[derive(Resource, Debug, Clone, Default)]
pub struct LastBroadcastLocations {
    pub locations: HashMap<String, String>,
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// System (host): broadcast the aggregated set when the day ends. The day
/// index sent is tomorrow's: distribution happens at day end for the
/// upcoming day, and receivers key their cache to it.
pub fn publish_on_day_end(
    mut day_end: EventReader<DayEndEvent>,
    session: Res<Session>,
    date: Res<GameDate>,
    villagers: Res<Villagers>,
    mut ledger: ResMut<ScheduleLedger>,
    mut bus: EventWriter<ModMessageSent>,
) {
    for _ in day_end.read() {
        if !session.is_host {
            continue;
        }
        ledger.compute(*date, &villagers);

        let schedules: HashMap<String, WireNpcSchedule> = ledger
            .schedules()
            .iter()
            .map(|(key, schedule)| (key.clone(), schedule.into()))
            .collect();
        let message = SyncMessage::ScheduleSet {
            day_number: date.day_number() + 1,
            schedules,
        };
        match encode(message) {
            Ok(payload) => {
                info!(
                    "Broadcasting {} villager schedules for {}.",
                    ledger.schedules().len(),
                    GameDate::from_day_number(date.day_number() + 1)
                );
                bus.send(ModMessageSent {
                    channel: SCHEDULE_CHANNEL,
                    payload,
                });
            }
            Err(e) => warn!("Could not serialize the schedule broadcast: {}", e),
        }
    }
}

/// System (host): push an incremental update whenever a villager's current
/// location changes, carrying the resolved display name.
pub fn push_location_updates(
    session: Res<Session>,
    villagers: Res<Villagers>,
    mut last: ResMut<LastBroadcastLocations>,
    config: Res<AlmanacConfig>,
    translations: Res<Translations>,
    feed: Res<CustomLocationFeed>,
    host_names: Res<LocationNames>,
    mut bus: EventWriter<ModMessageSent>,
) {
    if !session.is_host {
        return;
    }
    for villager in &villagers.roster {
        let seen = last.locations.get(&villager.name);
        if seen == Some(&villager.current_location) {
            continue;
        }
        let first_sighting = seen.is_none();
        last.locations
            .insert(villager.name.clone(), villager.current_location.clone());
        // First sighting seeds the map without a broadcast.
        if first_sighting {
            continue;
        }

        let display = locations::resolve(
            &villager.current_location,
            config.use_address_names,
            &translations,
            &feed,
            &host_names,
        );
        let message = SyncMessage::LocationUpdate {
            npc: villager.name.clone(),
            location: display,
        };
        match encode(message) {
            Ok(payload) => {
                bus.send(ModMessageSent {
                    channel: SCHEDULE_CHANNEL,
                    payload,
                });
            }
            Err(e) => warn!(
                "Could not serialize the location update for {}: {}",
                villager.name, e
            ),
        }
    }
}

/// System (all peers): drain the inbound side of the bus and apply.
pub fn apply_inbound_messages(
    mut inbox: EventReader<ModMessageReceived>,
    mut ledger: ResMut<ScheduleLedger>,
) {
    for message in inbox.read() {
        if message.channel != SCHEDULE_CHANNEL {
            continue;
        }
        match decode(&message.payload) {
            Ok(SyncMessage::ScheduleSet {
                day_number,
                schedules,
            }) => {
                let date = GameDate::from_day_number(day_number);
                let schedules: HashMap<String, NpcSchedule> = schedules
                    .into_iter()
                    .map(|(key, wire)| (key, wire.into_schedule()))
                    .collect();
                info!(
                    "Received {} villager schedules for {}.",
                    schedules.len(),
                    date
                );
                ledger.replace(date, schedules);
            }
            Ok(SyncMessage::LocationUpdate { npc, location }) => {
                ledger.update_current_location(&npc, &location);
            }
            Err(e) => warn!("Dropping schedule message: {}", e),
        }
    }
}
