//! Manhunt: a hidden-movement pursuit game on a transit network.
//!
//! MisterX moves unseen and is revealed only on scheduled rounds. The
//! detectives hunt him, each standing on a station no one else may enter.
//! Every move costs a ticket of the kind the edge was declared for, and a
//! black ticket rides any edge.
//!
//! # Architecture
//!
//! - **Board**: stations, their per-mode edges and occupancy flags
//! - **Players**: the [`Player`] trait shared by [`Detective`] and [`MisterX`]
//! - **Pathfinding**: ticket-constrained ways through the network
//! - **Speculation**: scoped apply and undo used by move ranking
//! - **Rules**: win conditions checked before every turn
//! - **Engine**: the tick-driven turn state machine

pub mod action;
pub mod board;
pub mod connector;
pub mod detective;
pub mod engine;
pub mod invariants;
pub mod mister_x;
pub mod pathfinding;
pub mod player;
pub mod rules;
pub mod snapshot;
pub mod speculation;
pub mod tactic;
pub mod types;
pub mod wallet;

pub use action::{Move, MoveError};
pub use board::{Board, BoardDescription, Station, StationDescription};
pub use connector::{GameView, HeadlessView, Ledger, Seat, TracingLedger};
pub use detective::{Detective, Intel};
pub use engine::{EngineError, EngineState, GameEngine, GameSetup, HumanTurnOutcome};
pub use invariants::{Invariant, InvariantSet, InvariantViolation, ManhuntInvariants, Table};
pub use mister_x::{MisterX, SightingLog};
pub use pathfinding::{TicketBudget, shortest_way};
pub use player::{Pawn, Player};
pub use rules::{WinState, check_winner};
pub use snapshot::{DetectiveState, DetectivesState, MisterXState, RestoredGame, SaveState};
pub use speculation::Speculation;
pub use tactic::{NO_TACTIC, TacticId, TacticResult};
pub use types::{Control, Point, StationId, Ticket, Transport};
pub use wallet::TicketWallet;
