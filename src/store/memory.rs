//! In-memory ticket store.
//!
//! Backs tests and local development. A single `RwLock` around the whole
//! table gives every trait method the same atomicity the Postgres
//! implementation gets from single-statement updates: each mutation holds
//! the write lock for its full read-check-write, so conditional updates are
//! race-free and readers never observe partial transitions.

use super::{StoreError, TicketStore};
use crate::types::{
    BuyerDetails, Participant, ParticipantId, Ticket, TicketId, TicketStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    tickets: Vec<Ticket>,
    participants: Vec<Participant>,
}

/// In-memory ticket store.
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    tables: RwLock<Tables>,
}

impl InMemoryTicketStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Storage("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Storage("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn ticket_count(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.tickets.len() as u64)
    }

    async fn insert_tickets(&self, numbers: &[u32]) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        let mut created = 0;
        for &number in numbers {
            if tables.tickets.iter().any(|t| t.number == number) {
                continue;
            }
            tables.tickets.push(Ticket {
                id: TicketId::new(),
                number,
                status: TicketStatus::Available,
                reserved_at: None,
                participant_id: None,
            });
            created += 1;
        }
        Ok(created)
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        let mut tickets = self.read()?.tickets.clone();
        tickets.sort_by_key(|t| t.number);
        Ok(tickets)
    }

    async fn reserved_tickets(&self) -> Result<Vec<(Ticket, Participant)>, StoreError> {
        let tables = self.read()?;
        let mut reserved: Vec<(Ticket, Participant)> = tables
            .tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Reserved)
            .filter_map(|t| {
                let owner = tables
                    .participants
                    .iter()
                    .find(|p| Some(p.id) == t.participant_id)?;
                Some((t.clone(), owner.clone()))
            })
            .collect();
        reserved.sort_by_key(|(t, _)| t.reserved_at);
        Ok(reserved)
    }

    async fn ticket_by_number(&self, number: u32) -> Result<Option<Ticket>, StoreError> {
        Ok(self
            .read()?
            .tickets
            .iter()
            .find(|t| t.number == number)
            .cloned())
    }

    async fn ticket_by_id(&self, id: TicketId) -> Result<Option<Ticket>, StoreError> {
        Ok(self.read()?.tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn participant_by_email(&self, email: &str) -> Result<Option<Participant>, StoreError> {
        Ok(self
            .read()?
            .participants
            .iter()
            .find(|p| p.email == email)
            .cloned())
    }

    async fn upsert_participant(&self, details: &BuyerDetails) -> Result<Participant, StoreError> {
        let mut tables = self.write()?;
        if let Some(existing) = tables.participants.iter().find(|p| p.email == details.email) {
            return Ok(existing.clone());
        }
        let participant = Participant {
            id: ParticipantId::new(),
            name: details.name.clone(),
            email: details.email.clone(),
            phone: details.phone.clone(),
            created_at: Utc::now(),
        };
        tables.participants.push(participant.clone());
        Ok(participant)
    }

    async fn tickets_for_participant(&self, id: ParticipantId) -> Result<Vec<Ticket>, StoreError> {
        let mut tickets: Vec<Ticket> = self
            .read()?
            .tickets
            .iter()
            .filter(|t| t.participant_id == Some(id))
            .cloned()
            .collect();
        tickets.sort_by_key(|t| t.number);
        Ok(tickets)
    }

    async fn try_reserve(
        &self,
        id: TicketId,
        participant: ParticipantId,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        let Some(ticket) = tables.tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if ticket.status != TicketStatus::Available {
            return Ok(false);
        }
        ticket.status = TicketStatus::Reserved;
        ticket.participant_id = Some(participant);
        ticket.reserved_at = Some(at);
        Ok(true)
    }

    async fn mark_sold(&self, id: TicketId) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        let Some(ticket) = tables.tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if ticket.status != TicketStatus::Reserved {
            return Ok(false);
        }
        ticket.status = TicketStatus::Sold;
        Ok(true)
    }

    async fn release_if_reserved(&self, id: TicketId) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        let Some(ticket) = tables.tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if ticket.status != TicketStatus::Reserved {
            return Ok(false);
        }
        ticket.status = TicketStatus::Available;
        ticket.participant_id = None;
        ticket.reserved_at = None;
        Ok(true)
    }

    async fn release_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<u32>, StoreError> {
        let mut tables = self.write()?;
        let mut released = Vec::new();
        for ticket in &mut tables.tickets {
            if ticket.status == TicketStatus::Reserved
                && ticket.reserved_at.is_some_and(|at| at < cutoff)
            {
                ticket.status = TicketStatus::Available;
                ticket.participant_id = None;
                ticket.reserved_at = None;
                released.push(ticket.number);
            }
        }
        released.sort_unstable();
        Ok(released)
    }
}
