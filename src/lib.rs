//! Raffle ticket reservation service.
//!
//! Displays a grid of numbered tickets, lets a visitor reserve one with
//! contact details, hands the buyer a WhatsApp deep link notifying the
//! admin, and lets the admin confirm payment through secret-gated routes.
//! Unconfirmed reservations expire: a cron-invoked sweeper returns stale
//! tickets to the pool.
//!
//! # Architecture
//!
//! ```text
//! HTTP (axum)          cron
//!    │                   │
//!    ▼                   ▼
//! api handlers      sweep binary
//!    │                   │
//!    ▼                   ▼
//! TicketLifecycle    run_sweep
//!    └───────┬───────────┘
//!            ▼
//!      TicketStore (trait)
//!       ├─ PostgresTicketStore (sqlx)
//!       └─ InMemoryTicketStore (tests, local dev)
//! ```
//!
//! Reads flow store → web surface; writes flow web surface / sweeper →
//! lifecycle engine → store. The only concurrency guard is the store's
//! conditional update ("reserve where still available"), checked by
//! affected-row count.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod clock;
pub mod config;
pub mod lifecycle;
pub mod notify;
pub mod server;
pub mod store;
pub mod sweep;
pub mod types;

pub use config::Config;
pub use lifecycle::{LifecycleError, TicketLifecycle};
pub use store::{InMemoryTicketStore, PostgresTicketStore, StoreError, TicketStore};
pub use sweep::{run_sweep, SweepOutcome};
pub use types::{BuyerDetails, Participant, ParticipantId, Ticket, TicketId, TicketStatus};
