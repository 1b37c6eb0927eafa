//! The board: every station of the network plus geometric queries.

mod description;
mod station;

pub use description::{BoardDescription, StationDescription};
pub use station::Station;

use super::action::MoveError;
use super::types::{Point, StationId, Ticket, Transport};
use crate::config::ConfigError;
use std::collections::BTreeSet;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument};

/// Holds all stations, indexed `1..=N`.
///
/// The graph is fixed once built; only the occupancy flags change during a
/// game.
#[derive(Debug, Clone)]
pub struct Board {
    stations: Vec<Station>,
}

impl Board {
    /// Builds and links the graph from a decoded description.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the station ids are not exactly `1..=N` in
    /// order, or if an edge points at an id outside that range.
    #[instrument(skip(description), fields(stations = description.stations.len()))]
    pub fn from_description(description: &BoardDescription) -> Result<Self, ConfigError> {
        let count = description.stations.len();

        // Create all stations first so edges can be checked against them
        let mut stations = Vec::with_capacity(count);
        for (idx, desc) in description.stations.iter().enumerate() {
            let expected = idx as StationId + 1;
            if desc.identifier != expected {
                return Err(ConfigError::new(format!(
                    "Station at index {} has id {}, expected {}",
                    idx, desc.identifier, expected
                )));
            }
            stations.push(Station::new(desc.identifier, desc.position));
        }

        // Link the created stations
        for (station, desc) in stations.iter_mut().zip(&description.stations) {
            for transport in Transport::iter() {
                for &to in desc.edges(transport) {
                    if to == 0 || to as usize > count {
                        return Err(ConfigError::new(format!(
                            "Station {} links to unknown station {} by {:?}",
                            desc.identifier, to, transport
                        )));
                    }
                    station.link(transport, to);
                }
            }
        }

        info!(stations = count, "Board built");
        Ok(Self { stations })
    }

    /// Decodes a JSON network document and builds the board from it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the document cannot be decoded or fails the
    /// id checks of [`Board::from_description`].
    #[instrument(skip(json))]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let description: BoardDescription = serde_json::from_str(json)
            .map_err(|e| ConfigError::new(format!("Failed to parse board: {}", e)))?;
        Self::from_description(&description)
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Returns true if the board has no stations.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Iterates all stations in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// Returns true if the id names a station on this board.
    pub fn contains(&self, id: StationId) -> bool {
        id >= 1 && id as usize <= self.stations.len()
    }

    /// Looks up a station by id.
    ///
    /// # Errors
    ///
    /// Returns `MoveError::UnknownStation` for ids outside `1..=N`.
    pub fn station(&self, id: StationId) -> Result<&Station, MoveError> {
        if !self.contains(id) {
            return Err(MoveError::UnknownStation(id));
        }
        Ok(&self.stations[id as usize - 1])
    }

    fn station_mut(&mut self, id: StationId) -> Result<&mut Station, MoveError> {
        if !self.contains(id) {
            return Err(MoveError::UnknownStation(id));
        }
        Ok(&mut self.stations[id as usize - 1])
    }

    /// Returns true if the station exists and is occupied.
    pub fn is_occupied(&self, id: StationId) -> bool {
        self.station(id).is_ok_and(Station::is_occupied)
    }

    /// Marks a station occupied.
    ///
    /// # Errors
    ///
    /// Fails if the station is unknown or already occupied.
    pub fn occupy(&mut self, id: StationId) -> Result<(), MoveError> {
        self.station_mut(id)?.set_occupied(true)
    }

    /// Clears the occupancy flag of a station.
    ///
    /// # Errors
    ///
    /// Fails if the station is unknown.
    pub fn release(&mut self, id: StationId) -> Result<(), MoveError> {
        self.station_mut(id)?.set_occupied(false)
    }

    /// Clears every occupancy flag.
    #[instrument(skip(self))]
    pub fn release_all(&mut self) {
        for station in &mut self.stations {
            station.clear();
        }
        debug!("All stations released");
    }

    /// Stations reachable from `from` with one ticket of the given kind.
    ///
    /// Unknown ids reach nothing.
    pub fn stations_reachable_by(&self, from: StationId, ticket: Ticket) -> BTreeSet<StationId> {
        self.station(from)
            .map(|s| s.stations_reachable_by(ticket))
            .unwrap_or_default()
    }

    /// Ticket kinds usable for a single move from `from` to `to`.
    ///
    /// Unknown ids are connected by nothing.
    pub fn tickets_to_reach(&self, from: StationId, to: StationId) -> BTreeSet<Ticket> {
        self.station(from)
            .map(|s| s.tickets_to_reach(to))
            .unwrap_or_default()
    }

    /// Nearest station to a point within `max_distance`.
    ///
    /// Ties keep the first station found in id order. Returns `None` if no
    /// station lies within the threshold.
    #[instrument(skip(self))]
    pub fn nearest_station(&self, point: Point, max_distance: f64) -> Option<&Station> {
        let mut best: Option<(&Station, f64)> = None;
        for station in &self.stations {
            let distance = point.distance(&station.position());
            if distance > max_distance {
                continue;
            }
            match best {
                Some((_, best_distance)) if best_distance <= distance => {}
                _ => best = Some((station, distance)),
            }
        }
        best.map(|(station, _)| station)
    }

    /// Station nearest to the centroid of the given stations.
    ///
    /// Unknown ids are ignored. Returns `None` only if no known station was
    /// given.
    #[instrument(skip(self, targets), fields(targets = targets.len()))]
    pub fn average_station(&self, targets: &BTreeSet<StationId>) -> Option<&Station> {
        let positions: Vec<Point> = targets
            .iter()
            .filter_map(|&id| self.station(id).ok())
            .map(Station::position)
            .collect();
        if positions.is_empty() {
            return None;
        }
        let count = positions.len() as f64;
        let centroid = Point::new(
            positions.iter().map(|p| p.x).sum::<f64>() / count,
            positions.iter().map(|p| p.y).sum::<f64>() / count,
        );
        self.nearest_station(centroid, f64::MAX)
    }
}
