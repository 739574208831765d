//! Almanac — villager schedule tracking and multiplayer schedule sync.
//!
//! A companion plugin for the game: it walks the villager roster once per
//! in-game day, records every schedule stop (led by a synthetic entry for the
//! default spawn position), and keeps the result in a date-keyed cache. In
//! multiplayer the host broadcasts the aggregated set over the game's message
//! bus and pushes incremental current-location updates; clients serve the
//! schedule menu purely from the received cache.
//!
//! The host game owns all simulation (NPC pathing, the clock, friendship,
//! the transport) and exposes it through the resources and events declared
//! in [`shared`]. The schedule menu itself lives with the rest of the game's
//! UI; this crate provides the data it lists via [`view`].

pub mod areas;
pub mod config;
pub mod i18n;
pub mod locations;
pub mod schedule;
pub mod shared;
pub mod sync;
pub mod view;

use bevy::prelude::*;

use shared::*;

pub struct AlmanacPlugin;

impl Plugin for AlmanacPlugin {
    fn build(&self, app: &mut App) {
        app
            // Host-owned resources; the game overwrites these defaults.
            .init_resource::<GameDate>()
            .init_resource::<Villagers>()
            .init_resource::<Relationships>()
            .init_resource::<LocationNames>()
            .init_resource::<Session>()
            // Plugin-owned resources
            .init_resource::<config::AlmanacConfig>()
            .init_resource::<i18n::Translations>()
            .init_resource::<areas::TileAreaCatalog>()
            .init_resource::<locations::CustomLocationFeed>()
            .init_resource::<schedule::aggregate::ScheduleLedger>()
            .init_resource::<sync::LastBroadcastLocations>()
            // Host hook and message-bus events
            .add_event::<DayEndEvent>()
            .add_event::<ModMessageSent>()
            .add_event::<ModMessageReceived>()
            // Startup: translations must land before the tile-area parse
            .add_systems(
                Startup,
                (
                    config::load_config_into,
                    i18n::setup_translations,
                    areas::load_tile_areas,
                    locations::probe_location_feed,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    schedule::refresh_ledger,
                    sync::publish_on_day_end,
                    sync::push_location_updates,
                    sync::apply_inbound_messages,
                ),
            );
    }
}
