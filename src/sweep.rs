//! Reservation expiry sweeper.
//!
//! Reclaims tickets abandoned mid-reservation so they return to the pool.
//! The sweeper is stateless and has no clock or loop of its own: `now` is an
//! explicit input and each invocation is one complete, idempotent pass,
//! designed to be fired on a fixed schedule by an out-of-process scheduler
//! (see the `sweep` binary).

use crate::store::{StoreError, TicketStore};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

/// Result of one sweep pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Numbers of the tickets reverted to `available`, ascending.
    pub released: Vec<u32>,
}

impl SweepOutcome {
    /// How many tickets this pass released.
    #[must_use]
    pub fn count(&self) -> usize {
        self.released.len()
    }
}

/// Run one sweep pass: revert every `reserved` ticket whose reservation is
/// strictly older than `now - timeout` back to `available`.
///
/// The whole batch is applied in a single atomic statement; readers never
/// observe a partially swept state, and a failing batch fails together.
///
/// # Errors
///
/// Returns an error if the store update fails.
pub async fn run_sweep(
    store: &dyn TicketStore,
    timeout: Duration,
    now: DateTime<Utc>,
) -> Result<SweepOutcome, StoreError> {
    let cutoff = now - timeout;
    let released = store.release_expired(cutoff).await?;
    info!(
        count = released.len(),
        %cutoff,
        "sweep pass complete"
    );
    Ok(SweepOutcome { released })
}
