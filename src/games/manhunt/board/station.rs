//! A single station (graph node) on the board.

use super::super::action::MoveError;
use super::super::types::{Point, StationId, Ticket, Transport};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use tracing::instrument;

/// A node of the transit network.
///
/// Identity is the id alone: two stations with equal ids compare equal
/// no matter what their links or occupancy look like.
#[derive(Debug, Clone)]
pub struct Station {
    id: StationId,
    position: Point,
    links: [BTreeSet<StationId>; Transport::COUNT],
    occupied: bool,
}

impl Station {
    /// Creates a station without any links.
    pub fn new(id: StationId, position: Point) -> Self {
        Self {
            id,
            position,
            links: Default::default(),
            occupied: false,
        }
    }

    /// Declares an edge of the given mode towards another station.
    ///
    /// Edges are directed as declared; the reverse edge is not added.
    pub fn link(&mut self, transport: Transport, to: StationId) {
        self.links[transport.index()].insert(to);
    }

    /// Returns the station id.
    pub fn id(&self) -> StationId {
        self.id
    }

    /// Returns the station position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns true if a detective currently stands here.
    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Sets the occupancy flag.
    ///
    /// # Errors
    ///
    /// Returns `MoveError::StationOccupied` when occupying a station that is
    /// already occupied. A station must be released before it is taken again.
    #[instrument(skip(self), fields(station = self.id))]
    pub fn set_occupied(&mut self, occupied: bool) -> Result<(), MoveError> {
        if self.occupied && occupied {
            return Err(MoveError::StationOccupied(self.id));
        }
        self.occupied = occupied;
        Ok(())
    }

    pub(super) fn clear(&mut self) {
        self.occupied = false;
    }

    /// Neighbors declared for one transport mode.
    pub fn links(&self, transport: Transport) -> &BTreeSet<StationId> {
        &self.links[transport.index()]
    }

    /// Returns true if at least one edge of this mode leaves the station.
    pub fn has_links(&self, transport: Transport) -> bool {
        !self.links[transport.index()].is_empty()
    }

    /// Stations reachable with one ticket of the given kind.
    ///
    /// A modal ticket follows the edges declared for its mode. The black
    /// ticket follows the union of all modal edges, boat included.
    pub fn stations_reachable_by(&self, ticket: Ticket) -> BTreeSet<StationId> {
        match ticket.transport() {
            Some(transport) => self.links[transport.index()].clone(),
            None => self.links.iter().flatten().copied().collect(),
        }
    }

    /// All directly connected stations regardless of mode.
    pub fn surrounding_stations(&self) -> BTreeSet<StationId> {
        self.stations_reachable_by(Ticket::Black)
    }

    /// Ticket kinds that can carry a player from here to `to` in one move.
    ///
    /// Every modal ticket whose edge set contains `to` qualifies. A boat edge
    /// qualifies the black ticket only. If anything qualifies, the black
    /// ticket does too. Empty when `to` is not a direct neighbor.
    pub fn tickets_to_reach(&self, to: StationId) -> BTreeSet<Ticket> {
        let mut tickets = BTreeSet::new();
        for ticket in [Ticket::Cab, Ticket::Bus, Ticket::Tube] {
            if let Some(transport) = ticket.transport()
                && self.links[transport.index()].contains(&to)
            {
                tickets.insert(ticket);
            }
        }
        if self.links[Transport::Boat.index()].contains(&to) {
            tickets.insert(Ticket::Black);
        }
        if !tickets.is_empty() {
            tickets.insert(Ticket::Black);
        }
        tickets
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Station {}

impl Hash for Station {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}
