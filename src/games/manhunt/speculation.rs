//! Scoped speculative moves used for ranking.
//!
//! A [`Speculation`] applies a move when it is created and reverts it when
//! it is dropped, so a ranking function cannot leave the board or the
//! wallet changed on any exit path.

use super::action::{Move, MoveError};
use super::board::Board;
use super::player::Player;
use super::types::StationId;
use tracing::{error, instrument};

/// A move applied for the lifetime of the guard.
///
/// Undo relocates the player back and refunds the ticket through
/// [`Player::add_ticket`]. Post-move hooks such as MisterX's sighting log
/// are not run.
pub struct Speculation<'a, P: Player> {
    player: &'a mut P,
    board: &'a mut Board,
    previous: StationId,
    mv: Move,
}

impl<'a, P: Player> Speculation<'a, P> {
    /// Applies `mv` and returns the guard that reverts it.
    ///
    /// # Errors
    ///
    /// Fails if the move cannot be applied. Nothing changes in that case and
    /// no guard exists to revert.
    #[instrument(skip(player, board), fields(player = player.id()))]
    pub fn begin(player: &'a mut P, board: &'a mut Board, mv: Move) -> Result<Self, MoveError> {
        let previous = player.station();
        player.advance(board, mv)?;
        Ok(Self {
            player,
            board,
            previous,
            mv,
        })
    }

    /// The player in its speculative position.
    pub fn player(&self) -> &P {
        self.player
    }

    /// The board with the speculative occupancy.
    pub fn board(&self) -> &Board {
        self.board
    }

    /// The move being speculated on.
    pub fn mv(&self) -> Move {
        self.mv
    }
}

impl<P: Player> Drop for Speculation<'_, P> {
    fn drop(&mut self) {
        if let Err(e) = self.player.relocate(self.board, self.previous) {
            error!(player = self.player.id(), error = %e, "Failed to revert speculative move");
        }
        self.player.add_ticket(self.mv.ticket);
    }
}
