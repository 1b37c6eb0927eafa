//! Placement invariant: every player stands on a station of the board.

use super::super::player::Player;
use super::{Invariant, Table};

/// Invariant: every player's station exists on the board.
pub struct PlacementInvariant;

impl Invariant<Table<'_>> for PlacementInvariant {
    fn holds(table: &Table<'_>) -> bool {
        table.board.contains(table.mister_x.station())
            && table
                .detectives
                .iter()
                .all(|d| table.board.contains(d.station()))
    }

    fn description() -> &'static str {
        "Every player stands on a known station"
    }
}
