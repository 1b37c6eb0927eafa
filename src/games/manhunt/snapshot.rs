//! Save-state model.
//!
//! Ticket counts are stored in the order tube, bus, cab, black, and the
//! active turn as a 1-based index where 0 means no turn was taken yet.

use super::board::Board;
use super::detective::Detective;
use super::mister_x::{MisterX, SightingLog};
use super::player::Player;
use super::types::{Control, StationId, Ticket};
use super::wallet::TicketWallet;
use crate::config::{ConfigError, GameConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// A whole game as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveState {
    /// The evader.
    pub mister_x: MisterXState,
    /// The pursuers.
    pub detectives: DetectivesState,
    /// 1-based index of the seat to move, 0 before the first turn.
    pub whos_turn: i64,
    /// Current round.
    pub curr_round_no: i64,
    /// Whether a win condition already holds. Derived, ignored on load.
    #[serde(default)]
    pub game_is_won: bool,
}

/// Persisted evader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MisterXState {
    /// Whether MisterX is AI controlled.
    pub ai: bool,
    /// Always written as null.
    #[serde(default)]
    pub possible_targets: Option<Vec<StationId>>,
    /// Station of the last reveal, 0 if none.
    pub last_shown_pos: i64,
    /// Current station.
    pub curr_pos: i64,
    /// Tickets as tube, bus, cab, black.
    pub remaining_tickets: [i64; 4],
    /// Ticket ordinals of every move.
    pub journey_board: Vec<i64>,
}

/// Persisted pursuers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectivesState {
    /// Number of detectives.
    pub no_of_detectives: i64,
    /// Whether the detectives are AI controlled.
    pub ai: bool,
    /// One entry per detective.
    pub players: Vec<DetectiveState>,
}

/// Persisted pursuer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectiveState {
    /// Current station.
    pub position: i64,
    /// Tickets as tube, bus, cab.
    pub remaining_tickets: [i64; 3],
}

/// Players and turn bookkeeping rebuilt from a [`SaveState`].
#[derive(Debug)]
pub struct RestoredGame {
    /// The evader.
    pub mister_x: MisterX,
    /// The pursuers, placed on the board.
    pub detectives: Vec<Detective>,
    /// 0-based index of the player whose turn it is.
    pub active: Option<usize>,
    /// Current round.
    pub round: u32,
}

impl SaveState {
    /// Captures the players and the turn bookkeeping.
    ///
    /// `active` is the seat that has yet to move.
    pub fn capture(
        mister_x: &MisterX,
        detectives: &[Detective],
        active: Option<usize>,
        round: u32,
        game_is_won: bool,
    ) -> Self {
        let wallet = mister_x.wallet();
        Self {
            mister_x: MisterXState {
                ai: mister_x.is_ai(),
                possible_targets: None,
                last_shown_pos: mister_x.last_seen().map_or(0, i64::from),
                curr_pos: i64::from(mister_x.station()),
                remaining_tickets: [
                    i64::from(wallet.count(Ticket::Tube)),
                    i64::from(wallet.count(Ticket::Bus)),
                    i64::from(wallet.count(Ticket::Cab)),
                    i64::from(wallet.count(Ticket::Black)),
                ],
                journey_board: mister_x
                    .sightings()
                    .entries()
                    .iter()
                    .map(|t| t.ordinal() as i64)
                    .collect(),
            },
            detectives: DetectivesState {
                no_of_detectives: detectives.len() as i64,
                ai: detectives.first().is_some_and(|d| d.is_ai()),
                players: detectives
                    .iter()
                    .map(|d| DetectiveState {
                        position: i64::from(d.station()),
                        remaining_tickets: [
                            i64::from(d.ticket_count(Ticket::Tube)),
                            i64::from(d.ticket_count(Ticket::Bus)),
                            i64::from(d.ticket_count(Ticket::Cab)),
                        ],
                    })
                    .collect(),
            },
            whos_turn: active.map_or(0, |i| i as i64 + 1),
            curr_round_no: i64::from(round),
            game_is_won,
        }
    }

    /// Decodes a save state from JSON.
    ///
    /// # Errors
    ///
    /// Fails if the text is not a structurally valid save state.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json)
            .map_err(|e| ConfigError::new(format!("Failed to parse save state: {}", e)))
    }

    /// Encodes the save state as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to write save state: {}", e)))
    }

    /// Rebuilds the players on `board`.
    ///
    /// The board must have no occupied stations.
    ///
    /// # Errors
    ///
    /// Fails on negative counts, a party size the config does not allow,
    /// unknown station ids or ticket ordinals, two detectives on one
    /// station, a turn index out of range, or a reveal station that does not
    /// match the log length.
    #[instrument(skip_all, fields(detectives = self.detectives.no_of_detectives))]
    pub fn restore(
        &self,
        board: &mut Board,
        config: &GameConfig,
    ) -> Result<RestoredGame, ConfigError> {
        let party = usize::try_from(self.detectives.no_of_detectives)
            .ok()
            .filter(|n| config.detective_counts().contains(n))
            .ok_or_else(|| {
                ConfigError::new(format!(
                    "{} detectives are not allowed",
                    self.detectives.no_of_detectives
                ))
            })?;
        if self.detectives.players.len() < party {
            return Err(ConfigError::new(format!(
                "Expected {} detectives, found {}",
                party,
                self.detectives.players.len()
            )));
        }

        let mister_x = self.restore_mister_x(board, config)?;

        let control = Control::from_ai_flag(self.detectives.ai);
        let mut detectives = Vec::with_capacity(party);
        for (idx, state) in self.detectives.players.iter().take(party).enumerate() {
            let [tube, bus, cab] = state.remaining_tickets;
            let wallet = TicketWallet::new(count(cab)?, count(bus)?, count(tube)?, 0);
            let station = station_id(board, state.position)?;
            let detective = Detective::new(idx as u32 + 1, board, station, control, wallet)
                .map_err(|e| ConfigError::new(format!("Cannot place detective: {}", e)))?;
            detectives.push(detective);
        }

        let active = match self.whos_turn {
            0 => None,
            n if n > 0 && n as usize <= party + 1 => Some(n as usize - 1),
            n => return Err(ConfigError::new(format!("Turn index {} out of range", n))),
        };
        let round = u32::try_from(self.curr_round_no)
            .map_err(|_| ConfigError::new(format!("Invalid round {}", self.curr_round_no)))?;

        info!(round, ?active, "Game restored");
        Ok(RestoredGame {
            mister_x,
            detectives,
            active,
            round,
        })
    }

    fn restore_mister_x(
        &self,
        board: &Board,
        config: &GameConfig,
    ) -> Result<MisterX, ConfigError> {
        let state = &self.mister_x;
        let [tube, bus, cab, black] = state.remaining_tickets;
        let wallet = TicketWallet::new(count(cab)?, count(bus)?, count(tube)?, count(black)?);

        let entries = state
            .journey_board
            .iter()
            .map(|&ordinal| {
                Ticket::from_ordinal(ordinal)
                    .ok_or_else(|| ConfigError::new(format!("Unknown ticket ordinal {}", ordinal)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let last_seen = match state.last_shown_pos {
            0 => None,
            pos => Some(station_id(board, pos)?),
        };
        let revealed = config
            .reveal_rounds()
            .iter()
            .any(|&r| r as usize <= entries.len());
        if revealed != last_seen.is_some() {
            return Err(ConfigError::new(format!(
                "Last shown position {} does not match {} logged moves",
                state.last_shown_pos,
                entries.len()
            )));
        }

        let sightings = SightingLog::restore(config.reveal_rounds().clone(), entries, last_seen);
        let station = station_id(board, state.curr_pos)?;
        MisterX::with_sightings(
            board,
            station,
            Control::from_ai_flag(state.ai),
            wallet,
            sightings,
        )
        .map_err(|e| ConfigError::new(format!("Cannot place MisterX: {}", e)))
    }
}

#[track_caller]
fn count(value: i64) -> Result<u32, ConfigError> {
    u32::try_from(value).map_err(|_| ConfigError::new(format!("Invalid ticket count {}", value)))
}

#[track_caller]
fn station_id(board: &Board, value: i64) -> Result<StationId, ConfigError> {
    StationId::try_from(value)
        .ok()
        .filter(|&id| board.contains(id))
        .ok_or_else(|| ConfigError::new(format!("Unknown station {}", value)))
}
