//! Game rules for manhunt.
//!
//! Pure functions over the players and the board. The engine evaluates them
//! at the start of every turn.

pub mod win;

pub use win::{WinState, check_winner};
