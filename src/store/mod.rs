//! Ticket store: the relational table interface the lifecycle engine
//! depends on.
//!
//! The [`TicketStore`] trait exposes atomic primitives (filter-by-status,
//! filter-by-unique-key, insert, conditional update, batch update). Every
//! method is required to apply its mutation atomically: a reader must never
//! observe a ticket with, say, `reserved` status but no reservation
//! timestamp. The conditional updates return whether a row changed, which is
//! the sole concurrency guard in the system.
//!
//! Two implementations are provided: [`PostgresTicketStore`] for production
//! and [`InMemoryTicketStore`] for tests and local development.

mod memory;
mod postgres;

pub use memory::InMemoryTicketStore;
pub use postgres::PostgresTicketStore;

use crate::types::{BuyerDetails, Participant, ParticipantId, Ticket, TicketId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Storage-level failure. Propagated unrecovered to the caller; this is an
/// interactive system where the user can simply resubmit.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure (connection loss, constraint violation).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store returned data the domain cannot represent.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Atomic persistence primitives over tickets and participants.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Number of tickets in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn ticket_count(&self) -> Result<u64, StoreError>;

    /// Insert tickets with the given numbers, all `available`. Numbers that
    /// already exist are skipped. Returns how many rows were created.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    async fn insert_tickets(&self, numbers: &[u32]) -> Result<u64, StoreError>;

    /// All tickets, ordered by ticket number.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError>;

    /// Reserved tickets joined with their participants, ordered by
    /// reservation time (oldest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn reserved_tickets(&self) -> Result<Vec<(Ticket, Participant)>, StoreError>;

    /// Look up a ticket by its unique number.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn ticket_by_number(&self, number: u32) -> Result<Option<Ticket>, StoreError>;

    /// Look up a ticket by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn ticket_by_id(&self, id: TicketId) -> Result<Option<Ticket>, StoreError>;

    /// Look up a participant by their unique email.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn participant_by_email(&self, email: &str) -> Result<Option<Participant>, StoreError>;

    /// Look up or create a participant by email. Existing participants are
    /// returned unchanged; the submitted name and phone only apply on first
    /// creation.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    async fn upsert_participant(&self, details: &BuyerDetails) -> Result<Participant, StoreError>;

    /// Tickets owned by a participant, ordered by ticket number.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn tickets_for_participant(&self, id: ParticipantId) -> Result<Vec<Ticket>, StoreError>;

    /// Conditionally reserve a ticket: set status `reserved`, attach the
    /// participant and stamp `reserved_at` in one atomic update, guarded by
    /// `status = 'available'`. Returns `false` when the guard did not hold
    /// (another actor won the race).
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    async fn try_reserve(
        &self,
        id: TicketId,
        participant: ParticipantId,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Conditionally mark a `reserved` ticket `sold`, leaving the participant
    /// reference and reservation timestamp untouched. Returns `false` when
    /// the ticket was not reserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    async fn mark_sold(&self, id: TicketId) -> Result<bool, StoreError>;

    /// Conditionally revert a `reserved` ticket to `available`, clearing the
    /// participant reference and reservation timestamp in one atomic update.
    /// Returns `false` when the ticket was not reserved (second release is a
    /// no-op).
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    async fn release_if_reserved(&self, id: TicketId) -> Result<bool, StoreError>;

    /// Revert every `reserved` ticket whose `reserved_at` is strictly older
    /// than `cutoff` back to `available` in a single atomic statement.
    /// Returns the numbers of the released tickets.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails; the whole batch fails together
    /// rather than partially applying.
    async fn release_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<u32>, StoreError>;
}
