//! Decisions returned by the AI players.

use super::action::Move;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Identifier of the tactic that proposed a move.
///
/// Detective tactics are numbered 1 to 4 in evaluation order. MisterX has a
/// single tactic. Zero marks a move that no tactic produced (human input or
/// a blocked detective).
pub type TacticId = u32;

/// Tactic id recorded for moves that no tactic produced.
pub const NO_TACTIC: TacticId = 0;

/// The chosen move together with the tactic that proposed it and its score.
#[derive(Debug, Clone, Copy, PartialEq, Getters, Serialize, Deserialize, new)]
pub struct TacticResult {
    /// Tactic that proposed the move.
    tactic: TacticId,
    /// The move.
    mv: Move,
    /// Combined ranking score.
    ranking: f32,
}

impl std::fmt::Display for TacticResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tactic {} -> {} ({:.3})",
            self.tactic, self.mv, self.ranking
        )
    }
}
