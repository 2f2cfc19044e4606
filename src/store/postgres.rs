//! `PostgreSQL`-backed ticket store.
//!
//! Uses sqlx with a connection pool. Every multi-field transition is a
//! single `UPDATE` statement, so atomicity comes from the statement itself
//! and no cross-statement transaction is needed. Races are detected with
//! conditional updates checked via affected-row counts.

use super::{StoreError, TicketStore};
use crate::types::{
    BuyerDetails, Participant, ParticipantId, Ticket, TicketId, TicketStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

/// Row shape shared by the ticket queries.
type TicketRow = (Uuid, i32, String, Option<DateTime<Utc>>, Option<Uuid>);

/// Row shape shared by the participant queries.
type ParticipantRow = (Uuid, String, String, String, DateTime<Utc>);

const TICKET_COLUMNS: &str = "id, ticket_number, status, reserved_at, participant_id";

fn ticket_from_row(row: TicketRow) -> Result<Ticket, StoreError> {
    let (id, number, status, reserved_at, participant_id) = row;
    let number = u32::try_from(number)
        .map_err(|_| StoreError::Storage(format!("negative ticket number {number}")))?;
    let status: TicketStatus = status
        .parse()
        .map_err(|e| StoreError::Storage(format!("{e}")))?;
    Ok(Ticket {
        id: TicketId::from_uuid(id),
        number,
        status,
        reserved_at,
        participant_id: participant_id.map(ParticipantId::from_uuid),
    })
}

fn participant_from_row(row: ParticipantRow) -> Participant {
    let (id, name, email, phone, created_at) = row;
    Participant {
        id: ParticipantId::from_uuid(id),
        name,
        email,
        phone,
        created_at,
    }
}

/// `PostgreSQL` ticket store.
#[derive(Clone)]
pub struct PostgresTicketStore {
    pool: PgPool,
}

impl PostgresTicketStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and build a pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        connect_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Access the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("migration failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl TicketStore for PostgresTicketStore {
    async fn ticket_count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets")
            .fetch_one(&self.pool)
            .await?;
        #[allow(clippy::cast_sign_loss)] // COUNT(*) is never negative
        Ok(count as u64)
    }

    async fn insert_tickets(&self, numbers: &[u32]) -> Result<u64, StoreError> {
        let ids: Vec<Uuid> = numbers.iter().map(|_| Uuid::new_v4()).collect();
        let numbers: Vec<i32> = numbers
            .iter()
            .map(|&n| {
                i32::try_from(n)
                    .map_err(|_| StoreError::Storage(format!("ticket number {n} out of range")))
            })
            .collect::<Result<_, _>>()?;

        let result = sqlx::query(
            "INSERT INTO tickets (id, ticket_number, status)
             SELECT id, number, 'available'
             FROM UNNEST($1::uuid[], $2::int4[]) AS t(id, number)
             ON CONFLICT (ticket_number) DO NOTHING",
        )
        .bind(&ids)
        .bind(&numbers)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        let rows: Vec<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY ticket_number"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ticket_from_row).collect()
    }

    async fn reserved_tickets(&self) -> Result<Vec<(Ticket, Participant)>, StoreError> {
        #[allow(clippy::type_complexity)]
        let rows: Vec<(
            Uuid,
            i32,
            String,
            Option<DateTime<Utc>>,
            Option<Uuid>,
            Uuid,
            String,
            String,
            String,
            DateTime<Utc>,
        )> = sqlx::query_as(
            "SELECT t.id, t.ticket_number, t.status, t.reserved_at, t.participant_id,
                    p.id, p.name, p.email, p.phone, p.created_at
             FROM tickets t
             JOIN participants p ON p.id = t.participant_id
             WHERE t.status = 'reserved'
             ORDER BY t.reserved_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(tid, num, status, at, pref, pid, name, email, phone, created)| {
                let ticket = ticket_from_row((tid, num, status, at, pref))?;
                let participant = participant_from_row((pid, name, email, phone, created));
                Ok((ticket, participant))
            })
            .collect()
    }

    async fn ticket_by_number(&self, number: u32) -> Result<Option<Ticket>, StoreError> {
        let number = i32::try_from(number)
            .map_err(|_| StoreError::Storage(format!("ticket number {number} out of range")))?;
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_number = $1"
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ticket_from_row).transpose()
    }

    async fn ticket_by_id(&self, id: TicketId) -> Result<Option<Ticket>, StoreError> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ticket_from_row).transpose()
    }

    async fn participant_by_email(&self, email: &str) -> Result<Option<Participant>, StoreError> {
        let row: Option<ParticipantRow> = sqlx::query_as(
            "SELECT id, name, email, phone, created_at FROM participants WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(participant_from_row))
    }

    async fn upsert_participant(&self, details: &BuyerDetails) -> Result<Participant, StoreError> {
        // DO NOTHING keeps existing participants immutable: a re-used email
        // attaches the reservation to the original record.
        sqlx::query(
            "INSERT INTO participants (id, name, email, phone)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&details.name)
        .bind(&details.email)
        .bind(&details.phone)
        .execute(&self.pool)
        .await?;

        self.participant_by_email(&details.email)
            .await?
            .ok_or_else(|| {
                StoreError::Storage(format!("participant {} missing after upsert", details.email))
            })
    }

    async fn tickets_for_participant(&self, id: ParticipantId) -> Result<Vec<Ticket>, StoreError> {
        let rows: Vec<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE participant_id = $1 ORDER BY ticket_number"
        ))
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ticket_from_row).collect()
    }

    async fn try_reserve(
        &self,
        id: TicketId,
        participant: ParticipantId,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE tickets
             SET status = 'reserved', participant_id = $2, reserved_at = $3
             WHERE id = $1 AND status = 'available'",
        )
        .bind(id.as_uuid())
        .bind(participant.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_sold(&self, id: TicketId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE tickets SET status = 'sold' WHERE id = $1 AND status = 'reserved'",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn release_if_reserved(&self, id: TicketId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE tickets
             SET status = 'available', participant_id = NULL, reserved_at = NULL
             WHERE id = $1 AND status = 'reserved'",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn release_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<u32>, StoreError> {
        let numbers: Vec<i32> = sqlx::query_scalar(
            "UPDATE tickets
             SET status = 'available', participant_id = NULL, reserved_at = NULL
             WHERE status = 'reserved' AND reserved_at < $1
             RETURNING ticket_number",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        numbers
            .into_iter()
            .map(|n| {
                u32::try_from(n)
                    .map_err(|_| StoreError::Storage(format!("negative ticket number {n}")))
            })
            .collect()
    }
}
