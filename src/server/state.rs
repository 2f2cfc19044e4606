//! Application state for the raffle HTTP server.

use crate::config::Config;
use crate::lifecycle::TicketLifecycle;
use crate::store::TicketStore;
use std::sync::Arc;

/// Shared resources for HTTP handlers.
///
/// Cloned (cheaply via Arc) for each request. Reads go straight to the
/// store; writes go through the lifecycle engine.
#[derive(Clone)]
pub struct AppState {
    /// Ticket store for read queries.
    pub store: Arc<dyn TicketStore>,

    /// Lifecycle engine for status transitions.
    pub lifecycle: Arc<TicketLifecycle>,

    /// Immutable process configuration (admin contact, secret code).
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn TicketStore>,
        lifecycle: Arc<TicketLifecycle>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            lifecycle,
            config,
        }
    }
}
