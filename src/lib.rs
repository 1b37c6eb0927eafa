//! Strictly Manhunt library - a hidden-movement pursuit game engine
//!
//! One concealed player, MisterX, flees across a transit network while a
//! party of detectives hunts him. Both sides can be driven by the built-in
//! AI players or by external input.
//!
//! # Architecture
//!
//! - **Config**: rules and tuning loaded from TOML
//! - **Games**: the manhunt board, players, rules and engine
//!
//! # Example
//!
//! ```no_run
//! use rand::SeedableRng;
//! use strictly_manhunt::{Board, GameConfig, GameEngine, GameSetup, Control, HeadlessView};
//!
//! # fn example(json: &str) -> anyhow::Result<()> {
//! let board = Board::from_json(json)?;
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
//! let setup = GameSetup::new(3, Control::Ai, Control::Ai);
//! let config = GameConfig::default();
//! let mut engine = GameEngine::new_game(board, config, HeadlessView, setup, &mut rng)?;
//! engine.start()?;
//! engine.step(std::time::Instant::now())?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod games;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig, TicketAllowance};

// Crate-level exports - Game types (manhunt)
pub use games::manhunt::{
    Board, BoardDescription, Control, Detective, DetectiveState, DetectivesState, EngineError,
    EngineState, GameEngine, GameSetup, GameView, HeadlessView, HumanTurnOutcome, Intel,
    Invariant, InvariantSet, InvariantViolation, Ledger, ManhuntInvariants, MisterX, MisterXState,
    Move, MoveError, NO_TACTIC, Pawn, Player, Point, RestoredGame, SaveState, Seat, SightingLog,
    Speculation, Station, StationDescription, StationId, Table, TacticId, TacticResult, Ticket,
    TicketBudget, TicketWallet, Transport, TracingLedger, WinState, check_winner, shortest_way,
};

// Crate-level exports - Module paths for finer-grained items
pub use games::manhunt;
