//! Per-kind ticket counts held by a player.

use super::action::MoveError;
use super::types::Ticket;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{instrument, trace};

/// Ticket counts indexed by [`Ticket::ordinal`].
///
/// Counts are unsigned so they can never go below zero; spending a ticket
/// that is not there is an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketWallet {
    counts: [u32; Ticket::COUNT],
}

impl TicketWallet {
    /// Creates a wallet with the given counts.
    pub fn new(cab: u32, bus: u32, tube: u32, black: u32) -> Self {
        Self {
            counts: [cab, bus, tube, black],
        }
    }

    /// Creates an empty wallet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of tickets of one kind.
    pub fn count(&self, ticket: Ticket) -> u32 {
        self.counts[ticket.ordinal()]
    }

    /// Returns true if at least one ticket of this kind is left.
    pub fn holds(&self, ticket: Ticket) -> bool {
        self.count(ticket) > 0
    }

    /// Kinds with at least one ticket left.
    pub fn available(&self) -> BTreeSet<Ticket> {
        Ticket::ALL.into_iter().filter(|&t| self.holds(t)).collect()
    }

    /// Returns true if no ticket of any kind is left.
    pub fn is_exhausted(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Adds one ticket of a kind.
    #[instrument(skip(self))]
    pub fn add(&mut self, ticket: Ticket) {
        self.counts[ticket.ordinal()] += 1;
        trace!(count = self.count(ticket), "Ticket added");
    }

    /// Spends one ticket of a kind.
    ///
    /// # Errors
    ///
    /// Returns `MoveError::TicketExhausted` if none is left; the wallet is
    /// unchanged in that case.
    #[instrument(skip(self))]
    pub fn remove(&mut self, ticket: Ticket) -> Result<(), MoveError> {
        let count = &mut self.counts[ticket.ordinal()];
        if *count == 0 {
            return Err(MoveError::TicketExhausted(ticket));
        }
        *count -= 1;
        Ok(())
    }

    /// Counts in ordinal order.
    pub fn counts(&self) -> [u32; Ticket::COUNT] {
        self.counts
    }
}
