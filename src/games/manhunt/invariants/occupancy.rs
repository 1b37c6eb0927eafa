//! Occupancy invariant: the occupied stations are exactly the detectives'.

use super::super::player::Player;
use super::{Invariant, Table};
use std::collections::BTreeSet;

/// Invariant: a station is occupied if and only if a detective stands on it.
///
/// No two detectives share a station, and MisterX never leaves a flag
/// behind.
pub struct OccupancyInvariant;

impl Invariant<Table<'_>> for OccupancyInvariant {
    fn holds(table: &Table<'_>) -> bool {
        let standing: BTreeSet<_> = table.detectives.iter().map(|d| d.station()).collect();
        if standing.len() != table.detectives.len() {
            return false;
        }
        let occupied: BTreeSet<_> = table
            .board
            .iter()
            .filter(|s| s.is_occupied())
            .map(|s| s.id())
            .collect();
        occupied == standing
    }

    fn description() -> &'static str {
        "Occupied stations are exactly the detectives' stations"
    }
}
