//! Decoded network description consumed by [`Board`](super::Board).
//!
//! Field names match the network documents the board is usually shipped
//! as, so a description can be decoded straight from JSON.

use super::super::types::{Point, StationId, Transport};
use serde::{Deserialize, Serialize};

/// The whole transit network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardDescription {
    /// Stations in id order.
    pub stations: Vec<StationDescription>,
}

/// One station of the network with its outgoing edges per mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDescription {
    /// Station id (1-based).
    pub identifier: StationId,
    /// Position on the board.
    pub position: Point,
    /// Cab neighbors.
    pub cab: Vec<StationId>,
    /// Bus neighbors.
    pub bus: Vec<StationId>,
    /// Tube neighbors.
    pub tube: Vec<StationId>,
    /// Boat neighbors.
    pub boat: Vec<StationId>,
}

impl StationDescription {
    /// Creates a station description without edges.
    pub fn new(identifier: StationId, x: f64, y: f64) -> Self {
        Self {
            identifier,
            position: Point::new(x, y),
            cab: Vec::new(),
            bus: Vec::new(),
            tube: Vec::new(),
            boat: Vec::new(),
        }
    }

    /// Adds outgoing edges of one mode (builder style).
    pub fn with(mut self, transport: Transport, to: impl IntoIterator<Item = StationId>) -> Self {
        self.edges_mut(transport).extend(to);
        self
    }

    /// Outgoing edges of one mode.
    pub fn edges(&self, transport: Transport) -> &[StationId] {
        match transport {
            Transport::Cab => &self.cab,
            Transport::Bus => &self.bus,
            Transport::Tube => &self.tube,
            Transport::Boat => &self.boat,
        }
    }

    fn edges_mut(&mut self, transport: Transport) -> &mut Vec<StationId> {
        match transport {
            Transport::Cab => &mut self.cab,
            Transport::Bus => &mut self.bus,
            Transport::Tube => &mut self.tube,
            Transport::Boat => &mut self.boat,
        }
    }
}

impl BoardDescription {
    /// Creates a description from a list of stations.
    pub fn new(stations: Vec<StationDescription>) -> Self {
        Self { stations }
    }

    /// Adds an undirected edge by declaring it on both endpoints.
    ///
    /// Does nothing for ids that are not part of the description.
    pub fn connect(&mut self, transport: Transport, a: StationId, b: StationId) {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(station) = self.stations.iter_mut().find(|s| s.identifier == from) {
                station.edges_mut(transport).push(to);
            }
        }
    }
}
