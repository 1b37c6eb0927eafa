//! Win detection for manhunt.

use super::super::board::Board;
use super::super::detective::Detective;
use super::super::mister_x::MisterX;
use super::super::player::Player;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Outcome of a win check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum WinState {
    /// The game goes on.
    #[display("No winner yet")]
    NoWin,
    /// Every detective ran out of tickets. MisterX wins.
    #[display("Detectives are out of tickets")]
    DetectivesBlocked,
    /// MisterX cannot move. Detectives win.
    #[display("MisterX is surrounded")]
    MisterXSurrounded,
    /// A detective stands on MisterX's station. Detectives win.
    #[display("MisterX was caught")]
    MisterXCaught,
    /// MisterX survived the round limit.
    #[display("MisterX escaped")]
    MisterXEscaped,
}

impl WinState {
    /// Returns true if the game is over.
    pub fn is_won(self) -> bool {
        self != WinState::NoWin
    }

    /// Returns true if the detectives won.
    pub fn detectives_win(self) -> bool {
        matches!(self, WinState::MisterXCaught | WinState::MisterXSurrounded)
    }
}

/// Evaluates the win conditions in priority order; the first match wins.
///
/// Capture beats being surrounded, which beats exhausted detectives, which
/// beats the round limit. The round limit fires once `round + 1` reaches
/// `max_rounds`.
#[instrument(skip(board, mister_x, detectives))]
pub fn check_winner(
    board: &Board,
    mister_x: &MisterX,
    detectives: &[Detective],
    round: u32,
    max_rounds: u32,
) -> WinState {
    if is_caught(mister_x, detectives) {
        WinState::MisterXCaught
    } else if mister_x.reachable_stations(board).is_empty() {
        WinState::MisterXSurrounded
    } else if detectives.iter().all(|d| d.is_exhausted()) {
        WinState::DetectivesBlocked
    } else if max_rounds <= round + 1 {
        WinState::MisterXEscaped
    } else {
        WinState::NoWin
    }
}

fn is_caught(mister_x: &MisterX, detectives: &[Detective]) -> bool {
    detectives.iter().any(|d| d.station() == mister_x.station())
}
