//! Domain types for the raffle service.
//!
//! Value objects and entities shared by the store, the lifecycle engine and
//! the web surface: identifiers, the ticket status machine and the two
//! persistent records (ticket, participant).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random `TicketId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TicketId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Creates a new random `ParticipantId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ParticipantId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Ticket status
// ============================================================================

/// Status of a raffle ticket.
///
/// The machine has a single reverse edge: `Reserved` tickets return to
/// `Available` when a reservation expires or is released. `Sold` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Free for anyone to reserve.
    Available,
    /// Held by a participant, pending payment confirmation.
    Reserved,
    /// Payment confirmed by the admin.
    Sold,
}

impl TicketStatus {
    /// Storage representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Sold => "sold",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "reserved" => Ok(Self::Reserved),
            "sold" => Ok(Self::Sold),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Error returned when a stored status string is not a known status.
#[derive(Debug, thiserror::Error)]
#[error("unknown ticket status: {0}")]
pub struct UnknownStatus(pub String);

// ============================================================================
// Records
// ============================================================================

/// One numbered raffle entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier.
    pub id: TicketId,
    /// Ticket number, unique and immutable after creation.
    pub number: u32,
    /// Current lifecycle status.
    pub status: TicketStatus,
    /// When the current reservation was made. Present while `Reserved`;
    /// kept on the record when the sale is confirmed.
    pub reserved_at: Option<DateTime<Utc>>,
    /// Owning participant. Present while `Reserved` or `Sold`.
    pub participant_id: Option<ParticipantId>,
}

/// A buyer, identified uniquely by email.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant identifier.
    pub id: ParticipantId,
    /// Full name as submitted on the reservation form.
    pub name: String,
    /// Email address, unique across participants.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// When this participant was first seen.
    pub created_at: DateTime<Utc>,
}

/// Contact details submitted with a reservation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerDetails {
    /// Buyer name.
    pub name: String,
    /// Buyer email; reuse attaches the reservation to the existing participant.
    pub email: String,
    /// Buyer phone number.
    pub phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [TicketStatus::Available, TicketStatus::Reserved, TicketStatus::Sold] {
            assert_eq!(status.as_str().parse::<TicketStatus>().ok(), Some(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("pending".parse::<TicketStatus>().is_err());
    }
}
