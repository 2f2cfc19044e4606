//! Router configuration for the raffle service.

use super::health::health_check;
use super::state::AppState;
use crate::api::{admin, tickets};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - Health check (no state)
/// - Public ticket grid and reservation endpoints under `/api`
/// - Admin review and confirmation endpoints, gated by the shared secret
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/tickets", get(tickets::list_tickets))
        .route("/tickets/:number", get(tickets::get_ticket))
        .route("/tickets/:number/reserve", post(tickets::reserve_ticket))
        .route("/admin/:secret/reservations", get(admin::list_reservations))
        .route(
            "/admin/:secret/tickets/:id/confirm",
            post(admin::confirm_ticket),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
