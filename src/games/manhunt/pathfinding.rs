//! Ticket-constrained pathfinding over the station graph.
//!
//! The search is a depth-first expansion in which every ticket kind opens an
//! independent branch with its own copy of the remaining budget. A station
//! is only re-entered when it is reached at a strictly shorter distance, and
//! occupied stations are never entered.
//!
//! The result is a feasible path within budget that is no longer than any
//! path found by a single branch. It is not guaranteed to spend the fewest
//! tickets when several modes are viable. Worst case cost is exponential in
//! the budget, which callers bound by passing small budgets.

use super::board::Board;
use super::types::{StationId, Ticket};
use super::wallet::TicketWallet;
use tracing::{instrument, trace};

/// Remaining tickets per kind available to a search.
pub type TicketBudget = TicketWallet;

/// Predecessor record for a reached station.
#[derive(Debug, Clone, Copy)]
struct Reached {
    via: StationId,
    distance: u32,
}

/// Finds a way from `start` to `destination` within `budget`.
///
/// Returns the stations to walk through, excluding `start` and including
/// `destination`. Empty if the destination cannot be reached, or if it is
/// the start itself.
#[instrument(skip(board), fields(budget = ?budget.counts()))]
pub fn shortest_way(
    board: &Board,
    start: StationId,
    destination: StationId,
    budget: TicketBudget,
) -> Vec<StationId> {
    let mut reached: Vec<Option<Reached>> = vec![None; board.len() + 1];
    explore(board, start, destination, 1, &mut reached, budget);

    // Walk back from the destination through the recorded predecessors
    let mut way = Vec::new();
    let mut current = destination;
    while let Some(record) = reached.get(current as usize).copied().flatten() {
        way.push(current);
        if record.via == start || way.len() > board.len() {
            break;
        }
        current = record.via;
    }
    way.reverse();

    trace!(length = way.len(), "Way computed");
    way
}

/// Number of moves needed to reach `destination` within `budget`.
///
/// Zero when unreachable or already there.
pub fn way_length(
    board: &Board,
    start: StationId,
    destination: StationId,
    budget: TicketBudget,
) -> usize {
    shortest_way(board, start, destination, budget).len()
}

fn explore(
    board: &Board,
    current: StationId,
    destination: StationId,
    distance: u32,
    reached: &mut [Option<Reached>],
    budget: TicketBudget,
) {
    // Never expand past the destination
    if current == destination {
        return;
    }
    let Ok(station) = board.station(current) else {
        return;
    };

    for ticket in Ticket::ALL {
        if !budget.holds(ticket) {
            continue;
        }
        let neighbors = station.stations_reachable_by(ticket);
        if neighbors.is_empty() {
            continue;
        }

        // Each ticket kind spends from its own copy of the budget
        let mut remaining = budget;
        if remaining.remove(ticket).is_err() {
            continue;
        }

        for next in neighbors {
            if board.is_occupied(next) {
                continue;
            }
            let Some(slot) = reached.get_mut(next as usize) else {
                continue;
            };
            if slot.is_some_and(|r| r.distance <= distance) {
                continue;
            }
            *slot = Some(Reached {
                via: current,
                distance,
            });
            explore(board, next, destination, distance + 1, reached, remaining);
        }
    }
}
