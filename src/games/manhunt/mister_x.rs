//! The evading role and its sighting log.

use super::action::{Move, MoveError};
use super::board::Board;
use super::detective::Detective;
use super::player::{Pawn, Player, reachable_by_any, target_reachability_score};
use super::speculation::Speculation;
use super::tactic::{TacticId, TacticResult};
use super::types::{Control, StationId, Ticket};
use super::wallet::TicketWallet;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Id MisterX always carries.
pub const MISTER_X_ID: u32 = 0;

/// MisterX's only tactic: rank every legal move.
pub const EXHAUSTIVE_TACTIC: TacticId = 1;

/// Tickets MisterX used, plus the reveal bookkeeping derived from them.
///
/// The station is revealed whenever the number of logged moves equals one
/// of the reveal rounds, and stays fixed until the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SightingLog {
    entries: Vec<Ticket>,
    reveal_rounds: Vec<u32>,
    last_seen: Option<StationId>,
    last_reveal_index: usize,
}

impl SightingLog {
    /// Creates an empty log with the given reveal schedule.
    pub fn new(reveal_rounds: Vec<u32>) -> Self {
        Self {
            entries: Vec::new(),
            reveal_rounds,
            last_seen: None,
            last_reveal_index: 0,
        }
    }

    /// Rebuilds a log from saved entries and the saved reveal station.
    ///
    /// The reveal index is the largest reveal round not beyond the number of
    /// entries, or zero if nothing was revealed yet.
    pub fn restore(
        reveal_rounds: Vec<u32>,
        entries: Vec<Ticket>,
        last_seen: Option<StationId>,
    ) -> Self {
        let last_reveal_index = match last_seen {
            Some(_) => reveal_rounds
                .iter()
                .map(|&r| r as usize)
                .filter(|&r| r <= entries.len())
                .max()
                .unwrap_or(0),
            None => 0,
        };
        Self {
            entries,
            reveal_rounds,
            last_seen,
            last_reveal_index,
        }
    }

    /// Appends a used ticket and reveals `station` on a reveal round.
    ///
    /// Returns true if this entry triggered a reveal.
    pub fn record(&mut self, ticket: Ticket, station: StationId) -> bool {
        self.entries.push(ticket);
        let moves = self.entries.len();
        if self.reveal_rounds.iter().any(|&r| r as usize == moves) {
            self.last_seen = Some(station);
            self.last_reveal_index = moves;
            return true;
        }
        false
    }

    /// All logged tickets in order.
    pub fn entries(&self) -> &[Ticket] {
        &self.entries
    }

    /// Number of logged moves.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no move was logged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Station of the most recent reveal.
    pub fn last_seen(&self) -> Option<StationId> {
        self.last_seen
    }

    /// Number of entries at the time of the most recent reveal.
    pub fn last_reveal_index(&self) -> usize {
        self.last_reveal_index
    }

    /// The reveal schedule.
    pub fn reveal_rounds(&self) -> &[u32] {
        &self.reveal_rounds
    }

    /// Tickets used after the most recent reveal.
    pub fn tickets_since_reveal(&self) -> &[Ticket] {
        self.entries.get(self.last_reveal_index..).unwrap_or(&[])
    }
}

/// The evader. Never marks stations occupied.
#[derive(Debug, Clone, PartialEq)]
pub struct MisterX {
    pawn: Pawn,
    sightings: SightingLog,
}

impl Player for MisterX {
    fn pawn(&self) -> &Pawn {
        &self.pawn
    }

    fn pawn_mut(&mut self) -> &mut Pawn {
        &mut self.pawn
    }

    fn occupies_stations(&self) -> bool {
        false
    }

    fn scored_tickets(&self) -> &'static [Ticket] {
        &Ticket::ALL
    }

    fn on_moved(&mut self, mv: Move) {
        if self.sightings.record(mv.ticket, mv.to) {
            info!(station = mv.to, moves = self.sightings.len(), "MisterX revealed");
        }
    }
}

impl MisterX {
    /// Places MisterX on the board with an empty log.
    ///
    /// # Errors
    ///
    /// Fails if the start station is unknown or occupied.
    pub fn new(
        board: &Board,
        start: StationId,
        control: Control,
        wallet: TicketWallet,
        reveal_rounds: Vec<u32>,
    ) -> Result<Self, MoveError> {
        Self::with_sightings(board, start, control, wallet, SightingLog::new(reveal_rounds))
    }

    /// Places MisterX on the board with an existing log.
    ///
    /// # Errors
    ///
    /// Fails if the start station is unknown or occupied.
    #[instrument(skip(board, wallet, sightings))]
    pub fn with_sightings(
        board: &Board,
        start: StationId,
        control: Control,
        wallet: TicketWallet,
        sightings: SightingLog,
    ) -> Result<Self, MoveError> {
        if board.station(start)?.is_occupied() {
            return Err(MoveError::StationOccupied(start));
        }
        Ok(Self {
            pawn: Pawn::new(MISTER_X_ID, control, start, wallet),
            sightings,
        })
    }

    /// The sighting log.
    pub fn sightings(&self) -> &SightingLog {
        &self.sightings
    }

    /// Station of the most recent reveal.
    pub fn last_seen(&self) -> Option<StationId> {
        self.sightings.last_seen()
    }

    /// Every legal move: each reachable station with each held ticket that
    /// connects to it.
    pub fn candidate_moves(&self, board: &Board) -> Vec<Move> {
        let held = self.available_tickets();
        self.reachable_stations(board)
            .into_iter()
            .flat_map(|to| {
                board
                    .tickets_to_reach(self.station(), to)
                    .into_iter()
                    .filter(|t| held.contains(t))
                    .map(move |ticket| Move::new(to, ticket))
            })
            .collect()
    }

    /// Picks the best ranked legal move.
    ///
    /// Equal scores go to the smaller destination id, then to the lower
    /// ticket ordinal. `None` if MisterX cannot move at all.
    ///
    /// # Errors
    ///
    /// Fails only if a candidate cannot be applied speculatively.
    #[instrument(skip_all, fields(station = self.station()))]
    pub fn play(
        &mut self,
        board: &mut Board,
        detectives: &[Detective],
    ) -> Result<Option<TacticResult>, MoveError> {
        let mut best: Option<TacticResult> = None;
        for mv in self.candidate_moves(board) {
            let ranking = self.rank(board, detectives, mv)?;
            debug!(%mv, ranking, "Candidate ranked");
            let better = match best {
                None => true,
                Some(b) => {
                    ranking > *b.ranking()
                        || (ranking == *b.ranking() && mv.to < b.mv().to)
                }
            };
            if better {
                best = Some(TacticResult::new(EXHAUSTIVE_TACTIC, mv, ranking));
            }
        }
        Ok(best)
    }

    /// Scores a move by applying it speculatively.
    ///
    /// The target score treats the post-move station as the only target and
    /// measures it against the reach of every detective. It grows when a
    /// detective can reach that station next turn, so with equal connectivity
    /// and tickets the AI prefers stations inside the detectives' reach.
    ///
    /// # Errors
    ///
    /// Fails if the move cannot be applied.
    pub fn rank(
        &mut self,
        board: &mut Board,
        detectives: &[Detective],
        mv: Move,
    ) -> Result<f32, MoveError> {
        let guard = Speculation::begin(self, board, mv)?;
        let (me, board) = (guard.player(), guard.board());

        let own: BTreeSet<StationId> = BTreeSet::from([me.station()]);
        let reachable = reachable_by_any(detectives, board);
        let target = target_reachability_score(&own, &reachable);
        let connectivity = me.connectivity_score(board);
        let scarcity = me.ticket_scarcity_score();

        Ok(target + connectivity + scarcity)
    }
}
