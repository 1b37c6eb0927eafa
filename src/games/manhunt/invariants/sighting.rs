//! Sighting invariant: reveal bookkeeping agrees with the log.

use super::{Invariant, Table};

/// Invariant: MisterX has a last known station exactly when a reveal round
/// has passed, and the reveal index is the latest such round.
pub struct SightingInvariant;

impl Invariant<Table<'_>> for SightingInvariant {
    fn holds(table: &Table<'_>) -> bool {
        let log = table.mister_x.sightings();
        let latest_reveal = log
            .reveal_rounds()
            .iter()
            .map(|&r| r as usize)
            .filter(|&r| r <= log.len())
            .max();
        match (log.last_seen(), latest_reveal) {
            (Some(_), Some(round)) => log.last_reveal_index() == round,
            (None, None) => log.last_reveal_index() == 0,
            _ => false,
        }
    }

    fn description() -> &'static str {
        "Last known station is set exactly from the latest reveal round"
    }
}
