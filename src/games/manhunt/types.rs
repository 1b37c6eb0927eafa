//! Core domain types for the manhunt game.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use tracing::instrument;

/// Identifier of a station on the board (1-based, dense).
pub type StationId = u32;

/// A 2D position on the board, both coordinates in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}

/// A transport mode an edge between two stations is declared for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum Transport {
    /// Taxi edge.
    Cab,
    /// Bus edge.
    Bus,
    /// Underground edge (the fast mode).
    Tube,
    /// River edge, only traversable with a black ticket.
    Boat,
}

impl Transport {
    /// Number of transport modes.
    pub const COUNT: usize = 4;

    /// Position of this mode in per-mode arrays.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A ticket kind consumed to traverse an edge.
///
/// The declaration order is the fixed total order used for tie-breaks:
/// `Cab < Bus < Tube < Black`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum Ticket {
    /// Taxi ticket.
    Cab,
    /// Bus ticket.
    Bus,
    /// Underground ticket.
    Tube,
    /// Universal ticket, valid on an edge of any mode.
    Black,
}

impl Ticket {
    /// Number of ticket kinds.
    pub const COUNT: usize = 4;

    /// All ticket kinds in their fixed order.
    pub const ALL: [Ticket; 4] = [Ticket::Cab, Ticket::Bus, Ticket::Tube, Ticket::Black];

    /// Ordinal of this ticket kind (`Cab = 0` .. `Black = 3`).
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Ticket kind for an ordinal, `None` if out of range.
    #[instrument]
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|idx| Ticket::iter().nth(idx))
    }

    /// The transport mode this ticket is issued for.
    ///
    /// The black ticket has no mode of its own.
    pub fn transport(self) -> Option<Transport> {
        match self {
            Ticket::Cab => Some(Transport::Cab),
            Ticket::Bus => Some(Transport::Bus),
            Ticket::Tube => Some(Transport::Tube),
            Ticket::Black => None,
        }
    }

    /// Short label used in ledgers and logs.
    pub fn label(self) -> &'static str {
        match self {
            Ticket::Cab => "CAB",
            Ticket::Bus => "BUS",
            Ticket::Tube => "TUBE",
            Ticket::Black => "BLACK",
        }
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Who controls a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    /// Moves are supplied from outside the engine.
    Human,
    /// Moves are computed by the player's decision procedure.
    Ai,
}

impl Control {
    /// Maps the persisted `ai` flag onto a control mode.
    pub fn from_ai_flag(ai: bool) -> Self {
        if ai { Control::Ai } else { Control::Human }
    }

    /// Returns true if the player is AI controlled.
    pub fn is_ai(self) -> bool {
        matches!(self, Control::Ai)
    }
}
