//! First-class invariants for manhunt.
//!
//! Invariants are logical properties of the table that must hold after
//! every committed move. The engine checks them in debug builds.

pub mod occupancy;
pub mod placement;
pub mod sighting;

pub use occupancy::OccupancyInvariant;
pub use placement::PlacementInvariant;
pub use sighting::SightingInvariant;

use super::board::Board;
use super::detective::Detective;
use super::mister_x::MisterX;

/// Borrowed view of everything the invariants inspect.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    /// The board with its occupancy flags.
    pub board: &'a Board,
    /// The evader.
    pub mister_x: &'a MisterX,
    /// The pursuers.
    pub detectives: &'a [Detective],
}

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implementations are provided for tuples.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    ///
    /// Returns Ok(()) if all invariants hold, or Err with a list of
    /// violations if any invariant fails.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if !I3::holds(state) {
            violations.push(InvariantViolation::new(I3::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// All manhunt invariants as a composable set.
pub type ManhuntInvariants = (OccupancyInvariant, PlacementInvariant, SightingInvariant);
