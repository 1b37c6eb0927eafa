//! The pursuing role.
//!
//! A detective proposes up to four moves, one per tactic, ranks each by
//! applying it speculatively, and keeps the best. Equal scores keep the
//! earlier tactic.

use super::action::{Move, MoveError};
use super::board::Board;
use super::pathfinding::{TicketBudget, shortest_way, way_length};
use super::player::{Pawn, Player, reachable_by_any, target_reachability_score};
use super::speculation::Speculation;
use super::tactic::TacticResult;
use super::types::{Control, StationId, Ticket, Transport};
use super::wallet::TicketWallet;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Distance at and beyond which the distance score is zero.
const DISTANCE_HORIZON: usize = 10;

/// Ticket kinds a detective is scored on. Detectives never hold black tickets.
const DETECTIVE_TICKETS: [Ticket; 3] = [Ticket::Cab, Ticket::Bus, Ticket::Tube];

/// What the detectives know about MisterX at the start of a turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intel {
    /// Station MisterX was last revealed at.
    pub last_seen: Option<StationId>,
    /// Stations MisterX may be at now.
    pub targets: BTreeSet<StationId>,
    /// Station nearest to the centroid of `targets`.
    pub average_station: Option<StationId>,
}

impl Intel {
    /// Derives the intel from the last reveal and the tickets used since.
    pub fn gather(board: &Board, last_seen: Option<StationId>, tickets: &[Ticket]) -> Self {
        let targets = Detective::possible_targets(board, last_seen, tickets);
        let average_station = board.average_station(&targets).map(|s| s.id());
        Self {
            last_seen,
            targets,
            average_station,
        }
    }
}

/// A pursuer. Occupies the station it stands on.
#[derive(Debug, Clone, PartialEq)]
pub struct Detective {
    pawn: Pawn,
}

impl Player for Detective {
    fn pawn(&self) -> &Pawn {
        &self.pawn
    }

    fn pawn_mut(&mut self) -> &mut Pawn {
        &mut self.pawn
    }

    fn occupies_stations(&self) -> bool {
        true
    }

    fn scored_tickets(&self) -> &'static [Ticket] {
        &DETECTIVE_TICKETS
    }
}

impl Detective {
    /// Places a detective on the board.
    ///
    /// # Errors
    ///
    /// Fails if the start station is unknown or already occupied.
    #[instrument(skip(board, wallet))]
    pub fn new(
        id: u32,
        board: &mut Board,
        start: StationId,
        control: Control,
        wallet: TicketWallet,
    ) -> Result<Self, MoveError> {
        board.occupy(start)?;
        Ok(Self {
            pawn: Pawn::new(id, control, start, wallet),
        })
    }

    /// Stations MisterX may be at after using `tickets` from `last_seen`.
    ///
    /// Empty without a reveal. Just the revealed station when no ticket was
    /// used since. Otherwise each ticket expands the whole frontier by one
    /// step of its kind, ignoring occupancy.
    #[instrument(skip(board, tickets), fields(tickets = tickets.len()))]
    pub fn possible_targets(
        board: &Board,
        last_seen: Option<StationId>,
        tickets: &[Ticket],
    ) -> BTreeSet<StationId> {
        let Some(start) = last_seen else {
            return BTreeSet::new();
        };
        tickets
            .iter()
            .fold(BTreeSet::from([start]), |frontier, &ticket| {
                frontier
                    .into_iter()
                    .flat_map(|id| board.stations_reachable_by(id, ticket))
                    .collect()
            })
    }

    /// Tactic 1: the smallest reachable station MisterX may be at.
    pub fn move_to_possible_target(
        &self,
        board: &Board,
        targets: &BTreeSet<StationId>,
    ) -> Option<Move> {
        let reachable = self.reachable_stations(board);
        let station = reachable.intersection(targets).next().copied();
        self.move_to(board, station)
    }

    /// Tactic 2: the smallest reachable station with an outgoing tube edge.
    pub fn move_to_tube_station(&self, board: &Board) -> Option<Move> {
        let station = self.reachable_stations(board).into_iter().find(|&id| {
            board
                .station(id)
                .is_ok_and(|s| s.has_links(Transport::Tube))
        });
        self.move_to(board, station)
    }

    /// Tactic 3: the first hop of a way to where MisterX was last seen.
    pub fn move_towards_last_seen(
        &self,
        board: &Board,
        last_seen: Option<StationId>,
    ) -> Option<Move> {
        let way = shortest_way(board, self.station(), last_seen?, *self.wallet());
        self.move_to(board, way.first().copied())
    }

    /// Tactic 4: the smallest reachable station.
    pub fn move_to_reachable_station(&self, board: &Board) -> Option<Move> {
        let station = self.reachable_stations(board).first().copied();
        self.move_to(board, station)
    }

    /// Picks this turn's move, or `None` if the detective is blocked.
    ///
    /// `others` are the remaining detectives. Their reachability counts
    /// towards the target score.
    ///
    /// # Errors
    ///
    /// Fails only if a proposed move cannot be applied speculatively, which
    /// indicates inconsistent board state.
    #[instrument(skip_all, fields(detective = self.id(), station = self.station()))]
    pub fn play(
        &mut self,
        board: &mut Board,
        others: &[&Detective],
        intel: &Intel,
    ) -> Result<Option<TacticResult>, MoveError> {
        let proposals = [
            self.move_to_possible_target(board, &intel.targets),
            self.move_to_tube_station(board),
            self.move_towards_last_seen(board, intel.last_seen),
            self.move_to_reachable_station(board),
        ];

        let mut best: Option<TacticResult> = None;
        for (tactic, proposal) in (1..=4).zip(proposals) {
            let Some(mv) = proposal else {
                continue;
            };
            let ranking = self.rank(board, others, mv, intel)?;
            debug!(tactic, %mv, ranking, "Tactic ranked");
            if best.is_none_or(|b| *b.ranking() < ranking) {
                best = Some(TacticResult::new(tactic, mv, ranking));
            }
        }
        Ok(best)
    }

    /// Scores a move by applying it speculatively.
    ///
    /// # Errors
    ///
    /// Fails if the move cannot be applied.
    pub fn rank(
        &mut self,
        board: &mut Board,
        others: &[&Detective],
        mv: Move,
        intel: &Intel,
    ) -> Result<f32, MoveError> {
        let guard = Speculation::begin(self, board, mv)?;
        let (me, board) = (guard.player(), guard.board());

        let reachable = reachable_by_any(others.iter().copied().chain([me]), board);
        let target = target_reachability_score(&intel.targets, &reachable);
        let distance = me.distance_score(board, intel.average_station);
        let connectivity = me.connectivity_score(board);
        let scarcity = me.ticket_scarcity_score();

        Ok(target + distance + connectivity + scarcity)
    }

    /// Closeness to a reference station, scaled into the ranking range.
    ///
    /// Measured as the length of a way using up to ten of each modal ticket.
    /// Zero without a reference or when the way is ten moves or longer.
    pub fn distance_score(&self, board: &Board, reference: Option<StationId>) -> f32 {
        let Some(reference) = reference else {
            return 0.0;
        };
        let budget: TicketBudget = TicketWallet::new(10, 10, 10, 0);
        let length = way_length(board, self.station(), reference, budget);
        DISTANCE_HORIZON.saturating_sub(length) as f32
    }
}
