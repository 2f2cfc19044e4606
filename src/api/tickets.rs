//! Public ticket endpoints: the grid, one ticket, and the reservation form
//! submission.

use crate::lifecycle::LifecycleError;
use crate::notify;
use crate::server::{AppError, AppState};
use crate::types::{BuyerDetails, Ticket};
use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};

/// List all tickets, ordered by number.
///
/// The presentation layer draws the grid from this.
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn list_tickets(State(state): State<AppState>) -> Result<Json<Vec<Ticket>>, AppError> {
    let tickets = state
        .store
        .list_tickets()
        .await
        .map_err(|e| AppError::internal("Failed to list tickets").with_source(e.into()))?;
    Ok(Json(tickets))
}

/// Fetch one ticket by number (the reservation form's data source).
///
/// # Errors
///
/// Returns 404 if the number is unknown, 500 on storage failure.
pub async fn get_ticket(
    Path(number): Path<u32>,
    State(state): State<AppState>,
) -> Result<Json<Ticket>, AppError> {
    let ticket = state
        .store
        .ticket_by_number(number)
        .await
        .map_err(|e| AppError::internal("Failed to query ticket").with_source(e.into()))?
        .ok_or_else(|| AppError::not_found("Ticket", number))?;
    Ok(Json(ticket))
}

/// Reserve a ticket.
///
/// On success the buyer's browser is redirected (303) to the pre-filled
/// WhatsApp deep link notifying the admin. The engine re-checks availability
/// at commit time; losing that race surfaces as 409, distinct from the 404
/// of an unknown number.
///
/// # Errors
///
/// Returns 404 for an unknown number, 409 when the ticket was taken first,
/// 500 on storage failure.
pub async fn reserve_ticket(
    Path(number): Path<u32>,
    State(state): State<AppState>,
    Json(buyer): Json<BuyerDetails>,
) -> Result<Redirect, AppError> {
    let (ticket, _participant) =
        state
            .lifecycle
            .reserve(number, &buyer)
            .await
            .map_err(|e| match e {
                LifecycleError::NotFound => AppError::not_found("Ticket", number),
                LifecycleError::Conflict => AppError::conflict(format!(
                    "Ticket {number} was reserved by someone else while you filled the form"
                )),
                LifecycleError::Store(e) => {
                    AppError::internal("Failed to reserve ticket").with_source(e.into())
                }
            })?;

    let link = notify::whatsapp_link(&state.config.admin.contact, ticket.number, &buyer);
    Ok(Redirect::to(&link))
}
