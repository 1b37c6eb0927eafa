//! Collaborators the engine reports to.
//!
//! [`GameView`] receives everything a front end would display and answers
//! the one question the engine may ask (which ticket to use). [`Ledger`]
//! keeps a line-per-event record of the game.

use super::detective::Detective;
use super::mister_x::MisterX;
use super::player::Player;
use super::rules::WinState;
use super::tactic::TacticId;
use super::types::{StationId, Ticket};
use std::collections::BTreeSet;
use std::io;
use tracing::{debug, info, warn};

/// Whose turn it is, by position in the turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    /// MisterX.
    MisterX,
    /// The detective at this index.
    Detective(usize),
}

/// Callbacks for presenting the game.
pub trait GameView {
    /// Draws all players. MisterX is shown at `last_seen` only.
    fn draw_players(
        &mut self,
        mister_x: &MisterX,
        detectives: &[Detective],
        active: Seat,
        last_seen: Option<StationId>,
    );

    /// Shows the active player's tickets.
    fn show_player_state(&mut self, seat: Seat, player: &dyn Player);

    /// Asks which ticket to use when several would do.
    ///
    /// `None` cancels the move.
    fn choose_ticket(&mut self, station: StationId, tickets: &BTreeSet<Ticket>) -> Option<Ticket>;

    /// Reports that the selected station cannot be entered in one move.
    ///
    /// `None` when the input did not select a station at all.
    fn show_unreachable(&mut self, station: Option<StationId>);

    /// Reports that the player holds none of the tickets the move needs.
    fn show_insufficient_tickets(&mut self, station: StationId);

    /// Announces the end of the game.
    fn show_winner(&mut self, state: WinState);

    /// Writes one entry of MisterX's public logbook.
    fn set_logbook_entry(&mut self, round: u32, ticket: Ticket);

    /// Reports a failure of the ledger. The game goes on.
    fn show_ledger_error(&mut self, error: &io::Error);
}

/// A view that only logs. Ambiguous moves use the lowest ticket kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessView;

impl GameView for HeadlessView {
    fn draw_players(
        &mut self,
        mister_x: &MisterX,
        detectives: &[Detective],
        active: Seat,
        last_seen: Option<StationId>,
    ) {
        debug!(
            ?active,
            mister_x = mister_x.station(),
            ?last_seen,
            detectives = ?detectives.iter().map(|d| d.station()).collect::<Vec<_>>(),
            "Players"
        );
    }

    fn show_player_state(&mut self, seat: Seat, player: &dyn Player) {
        debug!(?seat, tickets = ?player.wallet().counts(), "Player state");
    }

    fn choose_ticket(&mut self, station: StationId, tickets: &BTreeSet<Ticket>) -> Option<Ticket> {
        let ticket = tickets.first().copied();
        debug!(station, ?ticket, "Ticket chosen");
        ticket
    }

    fn show_unreachable(&mut self, station: Option<StationId>) {
        warn!(?station, "Station not reachable");
    }

    fn show_insufficient_tickets(&mut self, station: StationId) {
        warn!(station, "Not enough tickets");
    }

    fn show_winner(&mut self, state: WinState) {
        info!(%state, "Game over");
    }

    fn set_logbook_entry(&mut self, round: u32, ticket: Ticket) {
        debug!(round, %ticket, "Logbook");
    }

    fn show_ledger_error(&mut self, error: &io::Error) {
        warn!(%error, "Ledger failed");
    }
}

/// Turn-by-turn record of a game.
pub trait Ledger {
    /// Records the players at the start of a game.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the entry cannot be stored.
    fn record_new_game(&mut self, mister_x: &MisterX, detectives: &[Detective]) -> io::Result<()>;

    /// Records a committed move.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the entry cannot be stored.
    fn record_move(
        &mut self,
        player: &dyn Player,
        from: StationId,
        tactic: TacticId,
        ranking: f32,
    ) -> io::Result<()>;

    /// Records the end of a game.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the entry cannot be stored.
    fn record_end(&mut self, state: WinState) -> io::Result<()>;
}

/// Emits ledger lines as tracing events. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLedger;

impl Ledger for TracingLedger {
    fn record_new_game(&mut self, mister_x: &MisterX, detectives: &[Detective]) -> io::Result<()> {
        info!(target: "manhunt::ledger", line = %new_game_line(mister_x, detectives), "New game");
        Ok(())
    }

    fn record_move(
        &mut self,
        player: &dyn Player,
        from: StationId,
        tactic: TacticId,
        ranking: f32,
    ) -> io::Result<()> {
        info!(target: "manhunt::ledger", line = %move_line(player, from, tactic, ranking), "Move");
        Ok(())
    }

    fn record_end(&mut self, state: WinState) -> io::Result<()> {
        info!(target: "manhunt::ledger", line = %end_line(state), "End");
        Ok(())
    }
}

/// `players,x_ai,detectives_ai,x_station,d1_station,...`
pub fn new_game_line(mister_x: &MisterX, detectives: &[Detective]) -> String {
    let detectives_ai = detectives.first().is_some_and(|d| d.is_ai());
    let mut fields = vec![
        (detectives.len() + 1).to_string(),
        mister_x.is_ai().to_string(),
        detectives_ai.to_string(),
        mister_x.station().to_string(),
    ];
    fields.extend(detectives.iter().map(|d| d.station().to_string()));
    fields.join(",")
}

/// `id,from,to,cab,bus,tube,black,tactic,ranking`
pub fn move_line(player: &dyn Player, from: StationId, tactic: TacticId, ranking: f32) -> String {
    let [cab, bus, tube, black] = player.wallet().counts();
    format!(
        "{},{},{},{},{},{},{},{},{:.6}",
        player.id(),
        from,
        player.station(),
        cab,
        bus,
        tube,
        black,
        tactic,
        ranking
    )
}

/// `1` if the detectives won, `0` otherwise.
pub fn end_line(state: WinState) -> String {
    if state.detectives_win() { "1" } else { "0" }.to_string()
}
