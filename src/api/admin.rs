//! Admin endpoints: review reserved tickets and confirm sales.
//!
//! Both routes are gated by the shared secret code carried in the URL; a
//! mismatch is a plain 403 with no hint about valid codes.

use crate::lifecycle::LifecycleError;
use crate::server::{AppError, AppState};
use crate::types::{Participant, Ticket, TicketId};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

/// One pending reservation, as shown on the admin review page.
#[derive(Debug, Serialize)]
pub struct ReservationEntry {
    /// The reserved ticket.
    pub ticket: Ticket,
    /// Who reserved it.
    pub participant: Participant,
}

fn ensure_admin(state: &AppState, secret: &str) -> Result<(), AppError> {
    if secret == state.config.admin.secret_code {
        Ok(())
    } else {
        Err(AppError::forbidden("Forbidden"))
    }
}

/// List reserved tickets with their participants, oldest reservation first.
///
/// # Errors
///
/// Returns 403 on secret mismatch, 500 on storage failure.
pub async fn list_reservations(
    Path(secret): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ReservationEntry>>, AppError> {
    ensure_admin(&state, &secret)?;

    let reserved = state
        .store
        .reserved_tickets()
        .await
        .map_err(|e| AppError::internal("Failed to list reservations").with_source(e.into()))?;

    Ok(Json(
        reserved
            .into_iter()
            .map(|(ticket, participant)| ReservationEntry {
                ticket,
                participant,
            })
            .collect(),
    ))
}

/// Confirm payment for a reserved ticket, marking it sold.
///
/// # Errors
///
/// Returns 403 on secret mismatch, 404 for an unknown ticket, 409 when the
/// ticket is not currently reserved, 500 on storage failure.
pub async fn confirm_ticket(
    Path((secret, id)): Path<(String, Uuid)>,
    State(state): State<AppState>,
) -> Result<Json<Ticket>, AppError> {
    ensure_admin(&state, &secret)?;

    let ticket = state
        .lifecycle
        .confirm(TicketId::from_uuid(id))
        .await
        .map_err(|e| match e {
            LifecycleError::NotFound => AppError::not_found("Ticket", id),
            LifecycleError::Conflict => {
                AppError::conflict("Only a reserved ticket can be confirmed")
            }
            LifecycleError::Store(e) => {
                AppError::internal("Failed to confirm sale").with_source(e.into())
            }
        })?;

    Ok(Json(ticket))
}
