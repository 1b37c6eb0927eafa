//! Turn and round state machine.
//!
//! The engine is driven by an external scheduler calling [`GameEngine::step`]
//! with the current time. AI players wait out the thinking delay without
//! blocking; human players move through [`GameEngine::submit_station`] or
//! [`GameEngine::submit_point`].

use super::action::{Move, MoveError};
use super::board::Board;
use super::connector::{GameView, Ledger, Seat, TracingLedger};
use super::detective::{Detective, Intel};
use super::invariants::{InvariantSet, ManhuntInvariants, Table};
use super::mister_x::MisterX;
use super::player::Player;
use super::rules::{WinState, check_winner};
use super::snapshot::SaveState;
use super::tactic::{NO_TACTIC, TacticId};
use super::types::{Control, Point, StationId, Ticket};
use super::wallet::TicketWallet;
use crate::config::{ConfigError, GameConfig};
use derive_new::new;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Where the engine is in a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Not running.
    Stopped,
    /// About to check for a winner and hand the turn on.
    NextTurn,
    /// An AI player is thinking since the given instant.
    AiPlaying {
        /// When the turn began.
        since: Instant,
    },
    /// Waiting for a human move.
    HumanPlaying,
}

/// Result of a human move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanTurnOutcome {
    /// The move was applied.
    Moved(Move),
    /// The station cannot be entered in one move.
    Unreachable,
    /// The station is connected but no usable ticket is held.
    InsufficientTickets,
    /// The ticket choice was cancelled.
    Cancelled,
}

/// Engine sequencing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum EngineError {
    /// `start` was called on a running game.
    #[display("Game already started")]
    #[from(ignore)]
    AlreadyStarted,

    /// The operation needs a started game.
    #[display("Game not started")]
    #[from(ignore)]
    NotStarted,

    /// A human move arrived while no human is to move.
    #[display("Not a human turn")]
    #[from(ignore)]
    NotHumanTurn,

    /// A move could not be applied.
    #[display("Illegal move: {}", _0)]
    Move(MoveError),
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Move(e) => Some(e),
            _ => None,
        }
    }
}

/// Who plays and how many detectives take part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct GameSetup {
    /// Number of detectives.
    pub detectives: usize,
    /// Control of MisterX.
    pub mister_x: Control,
    /// Control shared by all detectives.
    pub detective_control: Control,
}

/// Runs one game of manhunt.
pub struct GameEngine<V: GameView> {
    board: Board,
    config: GameConfig,
    mister_x: MisterX,
    detectives: Vec<Detective>,
    turn_order: Vec<Seat>,
    active: Option<usize>,
    round: u32,
    /// The active seat has finished its move.
    turn_done: bool,
    state: EngineState,
    view: V,
    ledger: Box<dyn Ledger>,
}

impl<V: GameView> std::fmt::Debug for GameEngine<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("mister_x", &self.mister_x)
            .field("detectives", &self.detectives)
            .field("active", &self.active)
            .field("round", &self.round)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<V: GameView> GameEngine<V> {
    /// Creates an engine from players already placed on `board`.
    ///
    /// # Errors
    ///
    /// Fails if the config is invalid or the players are inconsistent with
    /// the board.
    #[instrument(skip_all, fields(detectives = detectives.len()))]
    pub fn with_players(
        board: Board,
        config: GameConfig,
        view: V,
        mister_x: MisterX,
        detectives: Vec<Detective>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let table = Table {
            board: &board,
            mister_x: &mister_x,
            detectives: &detectives,
        };
        if let Err(violations) = ManhuntInvariants::check_all(&table) {
            let descriptions: Vec<_> = violations.into_iter().map(|v| v.description).collect();
            return Err(ConfigError::new(format!(
                "Inconsistent players: {}",
                descriptions.join("; ")
            )));
        }
        Ok(Self {
            board,
            config,
            mister_x,
            detectives,
            turn_order: Vec::new(),
            active: None,
            round: 0,
            turn_done: false,
            state: EngineState::Stopped,
            view,
            ledger: Box::new(TracingLedger),
        })
    }

    /// Sets up a new game with start stations drawn from the config.
    ///
    /// MisterX takes the first drawn station and detectives `1..=n` the rest.
    ///
    /// # Errors
    ///
    /// Fails if the party size is not allowed, a start position is not on
    /// the board, or there are not enough distinct start positions.
    #[instrument(skip(board, config, view, rng))]
    pub fn new_game<R: Rng + ?Sized>(
        mut board: Board,
        config: GameConfig,
        view: V,
        setup: GameSetup,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if !config.detective_counts().contains(&setup.detectives) {
            return Err(ConfigError::new(format!(
                "{} detectives are not allowed, expected one of {:?}",
                setup.detectives,
                config.detective_counts()
            )));
        }

        let mut pool = config.start_positions().clone();
        pool.sort_unstable();
        pool.dedup();
        if let Some(id) = pool.iter().find(|&&id| !board.contains(id)) {
            return Err(ConfigError::new(format!("Start position {} is not on the board", id)));
        }
        if pool.len() <= setup.detectives {
            return Err(ConfigError::new(format!(
                "{} start positions cannot seat {} players",
                pool.len(),
                setup.detectives + 1
            )));
        }
        let starts: Vec<StationId> = pool
            .choose_multiple(rng, setup.detectives + 1)
            .copied()
            .collect();
        let Some((&x_start, detective_starts)) = starts.split_first() else {
            return Err(ConfigError::new("No start position drawn".to_string()));
        };

        board.release_all();
        let mister_x = MisterX::new(
            &board,
            x_start,
            setup.mister_x,
            config.mister_x_tickets().wallet(),
            config.reveal_rounds().clone(),
        )
        .map_err(|e| ConfigError::new(format!("Cannot place MisterX: {}", e)))?;

        let allowance = config.detective_tickets();
        let wallet = TicketWallet::new(*allowance.cab(), *allowance.bus(), *allowance.tube(), 0);
        let mut detectives = Vec::with_capacity(setup.detectives);
        for (idx, &start) in detective_starts.iter().enumerate() {
            let detective = Detective::new(
                idx as u32 + 1,
                &mut board,
                start,
                setup.detective_control,
                wallet,
            )
            .map_err(|e| ConfigError::new(format!("Cannot place detective: {}", e)))?;
            detectives.push(detective);
        }

        info!(mister_x = x_start, detectives = ?detective_starts, "New game set up");
        Self::with_players(board, config, view, mister_x, detectives)
    }

    /// Rebuilds an engine from a save state.
    ///
    /// Logbook entries are replayed into the view. The engine starts in
    /// `Stopped`; the first turn after `start` goes to the saved seat, which
    /// has not moved yet.
    ///
    /// # Errors
    ///
    /// Fails on any semantic inconsistency of the save state.
    #[instrument(skip_all)]
    pub fn restore(
        mut board: Board,
        config: GameConfig,
        mut view: V,
        save: &SaveState,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        board.release_all();
        let restored = save.restore(&mut board, &config)?;
        for (idx, &ticket) in restored.mister_x.sightings().entries().iter().enumerate() {
            view.set_logbook_entry(idx as u32 + 1, ticket);
        }
        let mut engine =
            Self::with_players(board, config, view, restored.mister_x, restored.detectives)?;
        engine.active = restored.active;
        engine.round = restored.round;
        Ok(engine)
    }

    /// Replaces the ledger.
    pub fn with_ledger(mut self, ledger: impl Ledger + 'static) -> Self {
        self.ledger = Box::new(ledger);
        self
    }

    /// Starts the game.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyStarted` unless the engine is stopped.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.state != EngineState::Stopped {
            return Err(EngineError::AlreadyStarted);
        }
        // Occupancy is gone after a stop
        for detective in &self.detectives {
            if !self.board.is_occupied(detective.station()) {
                self.board.occupy(detective.station())?;
            }
        }
        self.turn_order = std::iter::once(Seat::MisterX)
            .chain((0..self.detectives.len()).map(Seat::Detective))
            .collect();
        if let Err(e) = self.ledger.record_new_game(&self.mister_x, &self.detectives) {
            warn!(error = %e, "Ledger failed");
            self.view.show_ledger_error(&e);
        }
        self.state = EngineState::NextTurn;
        info!(players = self.turn_order.len(), "Game started");
        Ok(())
    }

    /// Stops the game and releases every station.
    #[instrument(skip(self))]
    pub fn stop(&mut self) {
        self.board.release_all();
        self.state = EngineState::Stopped;
        info!("Game stopped");
    }

    /// Advances the state machine by one tick.
    ///
    /// # Errors
    ///
    /// Fails if an AI move cannot be applied, which indicates inconsistent
    /// state.
    pub fn step(&mut self, now: Instant) -> Result<(), EngineError> {
        match self.state {
            EngineState::Stopped | EngineState::HumanPlaying => Ok(()),
            EngineState::NextTurn => {
                self.next_turn(now);
                Ok(())
            }
            EngineState::AiPlaying { since } => {
                if now.saturating_duration_since(since) < self.config.thinking_delay() {
                    return Ok(());
                }
                self.play_ai()?;
                self.turn_done = true;
                self.state = EngineState::NextTurn;
                Ok(())
            }
        }
    }

    fn next_turn(&mut self, now: Instant) {
        let resumed = self.active.is_some() && !self.turn_done;
        // A resumed MisterX turn already opened its round
        let checked_round = match self.active {
            Some(0) if resumed => self.round.saturating_sub(1),
            _ => self.round,
        };
        let win = self.win_state_at(checked_round);
        if win.is_won() {
            info!(%win, round = self.round, "Game won");
            self.view.show_winner(win);
            if let Err(e) = self.ledger.record_end(win) {
                warn!(error = %e, "Ledger failed");
                self.view.show_ledger_error(&e);
            }
            self.state = EngineState::Stopped;
            return;
        }

        let count = self.turn_order.len().max(1);
        let next = match self.active {
            Some(i) if resumed => i % count,
            Some(i) => (i + 1) % count,
            None => 0,
        };
        self.active = Some(next);
        self.turn_done = false;
        let seat = self.turn_order.get(next).copied().unwrap_or(Seat::MisterX);
        if resumed {
            info!(?seat, round = self.round, "Turn resumed");
        } else if seat == Seat::MisterX {
            self.round += 1;
            info!(round = self.round, "Round started");
        }

        self.view.draw_players(
            &self.mister_x,
            &self.detectives,
            seat,
            self.mister_x.last_seen(),
        );
        let Some(player) = seat_player(&self.mister_x, &self.detectives, seat) else {
            error!(?seat, "Seat without player");
            self.state = EngineState::Stopped;
            return;
        };
        self.view.show_player_state(seat, player);

        self.state = match player.control() {
            Control::Ai => EngineState::AiPlaying { since: now },
            Control::Human => EngineState::HumanPlaying,
        };
        debug!(?seat, state = ?self.state, "Turn handed on");
    }

    #[instrument(skip(self), fields(round = self.round))]
    fn play_ai(&mut self) -> Result<(), EngineError> {
        let seat = self.active_seat().ok_or(EngineError::NotStarted)?;
        match seat {
            Seat::MisterX => {
                let from = self.mister_x.station();
                let Some(result) = self.mister_x.play(&mut self.board, &self.detectives)? else {
                    warn!("MisterX has no move");
                    return Ok(());
                };
                let mv = *result.mv();
                self.mister_x.apply_move(&mut self.board, mv)?;
                self.view.set_logbook_entry(self.round, mv.ticket);
                self.record_move(seat, from, *result.tactic(), *result.ranking());
            }
            Seat::Detective(idx) => {
                let intel = self.intel();
                let (before, rest) = self.detectives.split_at_mut(idx);
                let (me, after) = rest.split_first_mut().ok_or(EngineError::NotStarted)?;
                let others: Vec<&Detective> = before.iter().chain(after.iter()).collect();
                let from = me.station();
                let result = me.play(&mut self.board, &others, &intel)?;
                match result {
                    Some(result) => {
                        let mv = *result.mv();
                        me.apply_move(&mut self.board, mv)?;
                        self.mister_x.add_ticket(mv.ticket);
                        self.record_move(seat, from, *result.tactic(), *result.ranking());
                    }
                    None => {
                        info!(detective = idx + 1, "Detective is blocked");
                        self.record_move(seat, from, NO_TACTIC, 0.0);
                    }
                }
            }
        }
        self.check_invariants();
        Ok(())
    }

    /// Applies a human move to `station`.
    ///
    /// A single usable ticket is spent automatically; with several the view
    /// is asked to choose. Rejections are reported to the view and leave the
    /// turn open.
    ///
    /// # Errors
    ///
    /// Returns `NotHumanTurn` unless a human is to move.
    #[instrument(skip(self))]
    pub fn submit_station(&mut self, station: StationId) -> Result<HumanTurnOutcome, EngineError> {
        if self.state != EngineState::HumanPlaying {
            return Err(EngineError::NotHumanTurn);
        }
        let seat = self.active_seat().ok_or(EngineError::NotHumanTurn)?;
        let player =
            seat_player(&self.mister_x, &self.detectives, seat).ok_or(EngineError::NotHumanTurn)?;
        let from = player.station();

        let needed = self.board.tickets_to_reach(from, station);
        if needed.is_empty() || self.board.is_occupied(station) {
            warn!(station, "Station not reachable");
            self.view.show_unreachable(Some(station));
            return Ok(HumanTurnOutcome::Unreachable);
        }
        let usable: BTreeSet<Ticket> = needed
            .intersection(&player.available_tickets())
            .copied()
            .collect();
        if usable.is_empty() {
            warn!(station, "Not enough tickets");
            self.view.show_insufficient_tickets(station);
            return Ok(HumanTurnOutcome::InsufficientTickets);
        }

        let choice = if usable.len() > 1 {
            self.view.choose_ticket(station, &usable)
        } else {
            usable.first().copied()
        };
        let Some(ticket) = choice.filter(|t| usable.contains(t)) else {
            debug!(station, "Ticket choice cancelled");
            return Ok(HumanTurnOutcome::Cancelled);
        };

        let mv = Move::new(station, ticket);
        match seat {
            Seat::MisterX => {
                self.mister_x.apply_move(&mut self.board, mv)?;
                self.view.set_logbook_entry(self.round, ticket);
            }
            Seat::Detective(idx) => {
                let detective = self
                    .detectives
                    .get_mut(idx)
                    .ok_or(EngineError::NotHumanTurn)?;
                detective.apply_move(&mut self.board, mv)?;
                self.mister_x.add_ticket(ticket);
            }
        }
        self.record_move(seat, from, NO_TACTIC, 0.0);
        self.check_invariants();
        self.turn_done = true;
        self.state = EngineState::NextTurn;
        Ok(HumanTurnOutcome::Moved(mv))
    }

    /// Applies a human move to the station nearest to `point`.
    ///
    /// # Errors
    ///
    /// Returns `NotHumanTurn` unless a human is to move.
    #[instrument(skip(self))]
    pub fn submit_point(&mut self, point: Point) -> Result<HumanTurnOutcome, EngineError> {
        if self.state != EngineState::HumanPlaying {
            return Err(EngineError::NotHumanTurn);
        }
        match self
            .board
            .nearest_station(point, *self.config.click_distance())
            .map(|s| s.id())
        {
            Some(station) => self.submit_station(station),
            None => {
                self.view.show_unreachable(None);
                Ok(HumanTurnOutcome::Unreachable)
            }
        }
    }

    /// Evaluates the win conditions for the current position.
    pub fn is_game_won(&self) -> WinState {
        self.win_state_at(self.round)
    }

    fn win_state_at(&self, round: u32) -> WinState {
        check_winner(
            &self.board,
            &self.mister_x,
            &self.detectives,
            round,
            *self.config.max_rounds(),
        )
    }

    /// Captures the current position.
    ///
    /// The saved seat is the one to move next: between turns that is the
    /// seat after the one that just moved, opening a new round if it is
    /// MisterX's.
    pub fn snapshot(&self) -> SaveState {
        let (active, round) = self.pending_turn();
        SaveState::capture(
            &self.mister_x,
            &self.detectives,
            active,
            round,
            self.is_game_won().is_won(),
        )
    }

    fn pending_turn(&self) -> (Option<usize>, u32) {
        match self.active {
            Some(i) if self.turn_done => {
                let next = (i + 1) % self.turn_order.len().max(1);
                let round = if next == 0 { self.round + 1 } else { self.round };
                (Some(next), round)
            }
            _ => (self.active, self.round),
        }
    }

    /// What the detectives know about MisterX right now.
    pub fn intel(&self) -> Intel {
        Intel::gather(
            &self.board,
            self.mister_x.last_seen(),
            self.mister_x.sightings().tickets_since_reveal(),
        )
    }

    fn record_move(&mut self, seat: Seat, from: StationId, tactic: TacticId, ranking: f32) {
        let Some(player) = seat_player(&self.mister_x, &self.detectives, seat) else {
            return;
        };
        if let Err(e) = self.ledger.record_move(player, from, tactic, ranking) {
            warn!(error = %e, "Ledger failed");
            self.view.show_ledger_error(&e);
        }
    }

    fn check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        let table = Table {
            board: &self.board,
            mister_x: &self.mister_x,
            detectives: &self.detectives,
        };
        if let Err(violations) = ManhuntInvariants::check_all(&table) {
            for violation in &violations {
                error!(invariant = %violation.description, "Invariant violated");
            }
            debug_assert!(violations.is_empty(), "Invariants violated: {:?}", violations);
        }
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The config.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// MisterX.
    pub fn mister_x(&self) -> &MisterX {
        &self.mister_x
    }

    /// The detectives in turn order.
    pub fn detectives(&self) -> &[Detective] {
        &self.detectives
    }

    /// Current round, 0 before MisterX's first turn.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// 0-based index of the active player in the turn order.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// The active player's seat.
    pub fn active_seat(&self) -> Option<Seat> {
        let idx = self.active?;
        match self.turn_order.get(idx) {
            Some(&seat) => Some(seat),
            // Not started yet: derive the seat from the index
            None if idx == 0 => Some(Seat::MisterX),
            None if idx <= self.detectives.len() => Some(Seat::Detective(idx - 1)),
            None => None,
        }
    }

    /// The state machine state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// The view, mutably.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}

fn seat_player<'a>(
    mister_x: &'a MisterX,
    detectives: &'a [Detective],
    seat: Seat,
) -> Option<&'a dyn Player> {
    match seat {
        Seat::MisterX => Some(mister_x),
        Seat::Detective(idx) => detectives.get(idx).map(|d| d as &dyn Player),
    }
}
