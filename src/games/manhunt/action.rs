//! First-class move types for the manhunt game.
//!
//! A move names where a player goes and which ticket pays for it. It is
//! validated against the board and the player's wallet when applied.

use super::types::{StationId, Ticket};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// A move: travel to `to`, paying with `ticket`.
///
/// Two moves are equal when both the destination id and the ticket match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Move {
    /// Destination station.
    pub to: StationId,
    /// Ticket spent on the move.
    pub ticket: Ticket,
}

impl Move {
    /// Returns the destination.
    pub fn to(&self) -> StationId {
        self.to
    }

    /// Returns the ticket used.
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} by {}", self.to, self.ticket)
    }
}

/// Error raised when a move or a placement cannot be applied.
///
/// These represent sequencing bugs in the caller. They are reported, never
/// clamped away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The destination is occupied by a detective.
    #[display("Station {} is already occupied", _0)]
    StationOccupied(StationId),

    /// The player holds no ticket of this kind.
    #[display("No {} tickets left", _0)]
    TicketExhausted(Ticket),

    /// The id does not name a station on the board.
    #[display("Station {} does not exist", _0)]
    UnknownStation(StationId),
}

impl std::error::Error for MoveError {}
