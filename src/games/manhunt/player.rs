//! Shared player state and the capability trait both roles implement.
//!
//! Detectives and MisterX move, spend tickets and compute reachability the
//! same way. They differ in whether they mark stations occupied, which
//! ticket kinds their scores look at, and what happens after a move. Those
//! differences are the required methods of [`Player`]; everything else is
//! provided.

use super::action::{Move, MoveError};
use super::board::Board;
use super::types::{Control, StationId, Ticket};
use super::wallet::TicketWallet;
use std::collections::BTreeSet;
use tracing::{instrument, trace};

/// Typical branching factor the connectivity score is normalized by.
pub const CONNECTIVITY_NORMALIZATION: f32 = 13.0;

const CONNECTIVITY_WEIGHT: f32 = 4.0;
const TARGET_WEIGHT: f32 = 10.0;

/// Ticket counts at or below this value are scarce.
const SCARCE_COUNT: u32 = 2;

/// Scarcity score when no scored ticket kind is scarce.
const PLENTIFUL_SCORE: f32 = 3.0;

/// State every player carries regardless of role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pawn {
    id: u32,
    control: Control,
    station: StationId,
    wallet: TicketWallet,
}

impl Pawn {
    /// Creates the shared state. Does not touch the board.
    pub fn new(id: u32, control: Control, station: StationId, wallet: TicketWallet) -> Self {
        Self {
            id,
            control,
            station,
            wallet,
        }
    }

    /// Player id (0 for MisterX, 1.. for detectives).
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Who controls the player.
    pub fn control(&self) -> Control {
        self.control
    }

    /// Current station.
    pub fn station(&self) -> StationId {
        self.station
    }

    /// Remaining tickets.
    pub fn wallet(&self) -> &TicketWallet {
        &self.wallet
    }
}

/// Movement, ticket economy and ranking components shared by both roles.
pub trait Player {
    /// Shared state.
    fn pawn(&self) -> &Pawn;

    /// Shared state, mutably.
    fn pawn_mut(&mut self) -> &mut Pawn;

    /// Returns true if this role marks the station it stands on occupied.
    fn occupies_stations(&self) -> bool;

    /// Ticket kinds considered by the scarcity score and the exhaustion check.
    fn scored_tickets(&self) -> &'static [Ticket];

    /// Runs after a committed move. Not run for speculative moves.
    fn on_moved(&mut self, _mv: Move) {}

    /// Player id.
    fn id(&self) -> u32 {
        self.pawn().id
    }

    /// Who controls the player.
    fn control(&self) -> Control {
        self.pawn().control
    }

    /// Returns true if the player is AI controlled.
    fn is_ai(&self) -> bool {
        self.pawn().control.is_ai()
    }

    /// Current station.
    fn station(&self) -> StationId {
        self.pawn().station
    }

    /// Remaining tickets.
    fn wallet(&self) -> &TicketWallet {
        &self.pawn().wallet
    }

    /// Number of tickets of one kind.
    fn ticket_count(&self, ticket: Ticket) -> u32 {
        self.pawn().wallet.count(ticket)
    }

    /// Kinds the player holds at least one of.
    fn available_tickets(&self) -> BTreeSet<Ticket> {
        self.pawn().wallet.available()
    }

    /// Receives one ticket.
    fn add_ticket(&mut self, ticket: Ticket) {
        self.pawn_mut().wallet.add(ticket);
    }

    /// Spends one ticket.
    ///
    /// # Errors
    ///
    /// Fails with `TicketExhausted` if none is left.
    fn remove_ticket(&mut self, ticket: Ticket) -> Result<(), MoveError> {
        self.pawn_mut().wallet.remove(ticket)
    }

    /// Returns true if the player has no ticket of any scored kind left.
    fn is_exhausted(&self) -> bool {
        self.scored_tickets()
            .iter()
            .all(|&t| !self.pawn().wallet.holds(t))
    }

    /// Stations the player can enter with one held ticket.
    ///
    /// Occupied stations are never included.
    fn reachable_stations(&self, board: &Board) -> BTreeSet<StationId> {
        let Ok(station) = board.station(self.station()) else {
            return BTreeSet::new();
        };
        self.pawn()
            .wallet
            .available()
            .into_iter()
            .flat_map(|ticket| station.stations_reachable_by(ticket))
            .filter(|&id| !board.is_occupied(id))
            .collect()
    }

    /// Puts the player on another station without spending a ticket.
    ///
    /// # Errors
    ///
    /// Fails if the destination is unknown or occupied. Nothing changes in
    /// that case.
    #[instrument(skip(self, board), fields(player = self.id(), from = self.station()))]
    fn relocate(&mut self, board: &mut Board, to: StationId) -> Result<(), MoveError> {
        board.station(to)?;
        if board.is_occupied(to) {
            return Err(MoveError::StationOccupied(to));
        }
        if self.occupies_stations() {
            board.release(self.station())?;
            board.occupy(to)?;
        }
        self.pawn_mut().station = to;
        Ok(())
    }

    /// Relocates and spends the ticket without running [`Player::on_moved`].
    ///
    /// # Errors
    ///
    /// Fails if the ticket is not held or the destination cannot be entered.
    /// Nothing changes in that case.
    fn advance(&mut self, board: &mut Board, mv: Move) -> Result<(), MoveError> {
        if !self.pawn().wallet.holds(mv.ticket) {
            return Err(MoveError::TicketExhausted(mv.ticket));
        }
        self.relocate(board, mv.to)?;
        self.remove_ticket(mv.ticket)
    }

    /// Commits a move.
    ///
    /// # Errors
    ///
    /// Same as [`Player::advance`].
    #[instrument(skip(self, board), fields(player = self.id()))]
    fn apply_move(&mut self, board: &mut Board, mv: Move) -> Result<(), MoveError> {
        self.advance(board, mv)?;
        self.on_moved(mv);
        trace!(station = self.station(), "Move applied");
        Ok(())
    }

    /// Best held ticket for a single move to `to`.
    ///
    /// Picks the connecting kind held in the largest quantity; ties go to the
    /// lower ordinal. `None` if no held kind connects.
    fn ticket_to(&self, board: &Board, to: StationId) -> Option<Ticket> {
        let wallet = &self.pawn().wallet;
        board
            .tickets_to_reach(self.station(), to)
            .into_iter()
            .filter(|&t| wallet.holds(t))
            .fold(None, |best, ticket| match best {
                Some(b) if wallet.count(b) >= wallet.count(ticket) => Some(b),
                _ => Some(ticket),
            })
    }

    /// A move to `to` paid with the best held ticket.
    fn move_to(&self, board: &Board, to: Option<StationId>) -> Option<Move> {
        let to = to?;
        self.ticket_to(board, to).map(|ticket| Move::new(to, ticket))
    }

    /// Reachable station count scaled into the ranking range.
    fn connectivity_score(&self, board: &Board) -> f32 {
        self.reachable_stations(board).len() as f32 / CONNECTIVITY_NORMALIZATION
            * CONNECTIVITY_WEIGHT
    }

    /// Penalty for running low on any scored ticket kind.
    ///
    /// The plentiful score if every scored kind has more than two left,
    /// else the smallest count among the scarce kinds.
    fn ticket_scarcity_score(&self) -> f32 {
        self.scored_tickets()
            .iter()
            .map(|&t| self.ticket_count(t))
            .filter(|&count| count <= SCARCE_COUNT)
            .min()
            .map_or(PLENTIFUL_SCORE, |count| count as f32)
    }
}

/// Union of the reachable stations of several players.
pub fn reachable_by_any<'a, P>(
    players: impl IntoIterator<Item = &'a P>,
    board: &Board,
) -> BTreeSet<StationId>
where
    P: Player + 'a,
{
    players
        .into_iter()
        .flat_map(|p| p.reachable_stations(board))
        .collect()
}

/// Share of `targets` contained in `reachable`, scaled into the ranking range.
///
/// Zero when there are no targets.
pub fn target_reachability_score(
    targets: &BTreeSet<StationId>,
    reachable: &BTreeSet<StationId>,
) -> f32 {
    if targets.is_empty() {
        return 0.0;
    }
    let hit = targets.intersection(reachable).count();
    hit as f32 / targets.len() as f32 * TARGET_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_score_share() {
        let targets: BTreeSet<_> = [1, 2, 3, 4].into_iter().collect();
        let reachable: BTreeSet<_> = [2, 4, 9].into_iter().collect();
        assert_eq!(target_reachability_score(&targets, &reachable), 5.0);
        assert_eq!(target_reachability_score(&BTreeSet::new(), &reachable), 0.0);
    }
}
