//! Ticket lifecycle engine.
//!
//! The four-state machine at the heart of the service:
//!
//! ```text
//! (bootstrap) → available →(reserve)→ reserved →(confirm)→ sold
//!                    ↑                    │
//!                    └──(expire/release)──┘
//! ```
//!
//! `sold` is terminal; `reserved → available` is the only reverse edge.
//! Every transition is applied through a conditional update in the store, so
//! the "status must still be `available` at commit" check is atomic rather
//! than a separate read followed by a write.

use crate::clock::Clock;
use crate::store::{StoreError, TicketStore};
use crate::types::{BuyerDetails, Participant, Ticket, TicketId, TicketStatus};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Failure of a lifecycle operation.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The referenced ticket does not exist. Surfaced as a 404-equivalent.
    #[error("ticket not found")]
    NotFound,

    /// The ticket was not in the status the transition requires, typically
    /// because another actor got there first. Surfaced as a user-visible
    /// warning, not a hard error.
    #[error("ticket is no longer available")]
    Conflict,

    /// Storage failure, propagated unrecovered.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The state machine governing ticket status transitions.
pub struct TicketLifecycle {
    store: Arc<dyn TicketStore>,
    clock: Arc<dyn Clock>,
}

impl TicketLifecycle {
    /// Create an engine over the given store and clock.
    #[must_use]
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Populate the store with `count` tickets numbered `0..count`, all
    /// `available`, if and only if the store holds zero tickets. Safe to call
    /// at every process start.
    ///
    /// Returns how many tickets were created.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn bootstrap(&self, count: u32) -> Result<u64, LifecycleError> {
        if self.store.ticket_count().await? > 0 {
            debug!("tickets already present, skipping bootstrap");
            return Ok(0);
        }
        let numbers: Vec<u32> = (0..count).collect();
        let created = self.store.insert_tickets(&numbers).await?;
        info!(created, "bootstrapped ticket pool");
        Ok(created)
    }

    /// Reserve the ticket with the given number for the buyer.
    ///
    /// Looks up or creates the participant by email, then flips the ticket
    /// `available → reserved` with a conditional update that attaches the
    /// participant and stamps the reservation time in the same statement.
    /// Returns the reserved ticket and its owner.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::NotFound`] if no ticket carries `number`.
    /// - [`LifecycleError::Conflict`] if the ticket is not `available`, or
    ///   stopped being available between lookup and commit.
    /// - [`LifecycleError::Store`] on storage failure.
    pub async fn reserve(
        &self,
        number: u32,
        buyer: &BuyerDetails,
    ) -> Result<(Ticket, Participant), LifecycleError> {
        let ticket = self
            .store
            .ticket_by_number(number)
            .await?
            .ok_or(LifecycleError::NotFound)?;
        if ticket.status != TicketStatus::Available {
            return Err(LifecycleError::Conflict);
        }

        // Participant creation is kept even if the reserve below loses the
        // race: a participant exists from the first reservation attempt.
        let participant = self.store.upsert_participant(buyer).await?;

        let reserved = self
            .store
            .try_reserve(ticket.id, participant.id, self.clock.now())
            .await?;
        if !reserved {
            return Err(LifecycleError::Conflict);
        }

        let ticket = self
            .store
            .ticket_by_id(ticket.id)
            .await?
            .ok_or(LifecycleError::NotFound)?;
        info!(number, participant = %participant.id, "ticket reserved");
        Ok((ticket, participant))
    }

    /// Confirm payment for a reserved ticket, flipping it `reserved → sold`.
    /// The participant reference and reservation timestamp stay on the
    /// record.
    ///
    /// Only a `reserved` ticket can be confirmed; confirming an `available`
    /// or already `sold` ticket yields a conflict.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::NotFound`] if the ticket does not exist.
    /// - [`LifecycleError::Conflict`] if the ticket is not `reserved`.
    /// - [`LifecycleError::Store`] on storage failure.
    pub async fn confirm(&self, id: TicketId) -> Result<Ticket, LifecycleError> {
        let ticket = self
            .store
            .ticket_by_id(id)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        if !self.store.mark_sold(id).await? {
            return Err(LifecycleError::Conflict);
        }
        info!(number = ticket.number, "sale confirmed");

        self.store
            .ticket_by_id(id)
            .await?
            .ok_or(LifecycleError::NotFound)
    }

    /// Revert a reserved ticket to `available`, clearing the participant
    /// reference and reservation timestamp atomically.
    ///
    /// Idempotent in effect: returns `false` when the ticket was not
    /// reserved, so releasing twice is a no-op the second time.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::NotFound`] if the ticket does not exist.
    /// - [`LifecycleError::Store`] on storage failure.
    pub async fn release(&self, id: TicketId) -> Result<bool, LifecycleError> {
        if self.store.ticket_by_id(id).await?.is_none() {
            return Err(LifecycleError::NotFound);
        }
        let released = self.store.release_if_reserved(id).await?;
        if released {
            info!(ticket = %id, "reservation released");
        }
        Ok(released)
    }

    /// The store this engine writes through.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TicketStore> {
        &self.store
    }
}
