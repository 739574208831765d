//! Schedule domain: the per-stop model and the per-day aggregation cache.

pub mod aggregate;
pub mod entry;

use bevy::prelude::*;

use crate::shared::*;
use aggregate::ScheduleLedger;

/// System: keep the host's ledger keyed to the current date. On the first
/// tick of a new day the cache misses and the roster is re-walked; every
/// other tick this is a no-op. Clients never compute locally, they wait for
/// the host's broadcast.
pub fn refresh_ledger(
    session: Res<Session>,
    date: Res<GameDate>,
    villagers: Res<Villagers>,
    mut ledger: ResMut<ScheduleLedger>,
) {
    if !session.is_host {
        return;
    }
    ledger.compute(*date, &villagers);
}
