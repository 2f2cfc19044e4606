//! HTTP API integration tests.
//!
//! Runs the full router against the in-memory store, so routing, extractors,
//! the secret gate and the error mapping are exercised without a database.

#![allow(clippy::expect_used)] // Integration tests can use expect for setup

use axum::http::StatusCode;
use axum_test::TestServer;
use raffle::clock::SystemClock;
use raffle::config::{AdminConfig, Config, DatabaseConfig, RaffleConfig, ServerConfig};
use raffle::server::{build_router, AppState};
use raffle::{InMemoryTicketStore, TicketLifecycle, TicketStore};
use serde_json::{json, Value};
use std::sync::Arc;

const ADMIN_CODE: &str = "test-admin-code";

fn test_config() -> Config {
    Config {
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            connect_timeout: 1,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            log_level: "info".to_string(),
            secret_key: "test-secret".to_string(),
        },
        admin: AdminConfig {
            contact: "15550000000".to_string(),
            secret_code: ADMIN_CODE.to_string(),
        },
        raffle: RaffleConfig {
            ticket_count: 100,
            reservation_timeout_minutes: 120,
        },
    }
}

async fn setup() -> TestServer {
    let store: Arc<dyn TicketStore> = Arc::new(InMemoryTicketStore::new());
    let lifecycle = Arc::new(TicketLifecycle::new(store.clone(), Arc::new(SystemClock)));
    lifecycle.bootstrap(100).await.expect("bootstrap");

    let state = AppState::new(store, lifecycle, Arc::new(test_config()));
    TestServer::new(build_router(state)).expect("test server")
}

fn ana() -> Value {
    json!({"name": "Ana", "email": "ana@x.com", "phone": "555"})
}

#[tokio::test]
async fn health_returns_ok() {
    let server = setup().await;
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn grid_lists_all_tickets_by_number() {
    let server = setup().await;
    let response = server.get("/api/tickets").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let tickets: Vec<Value> = response.json();
    assert_eq!(tickets.len(), 100);
    assert_eq!(tickets[0]["number"], 0);
    assert_eq!(tickets[99]["number"], 99);
    assert!(tickets.iter().all(|t| t["status"] == "available"));
}

#[tokio::test]
async fn single_ticket_lookup() {
    let server = setup().await;

    let response = server.get("/api/tickets/7").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let ticket: Value = response.json();
    assert_eq!(ticket["number"], 7);

    let missing = server.get("/api/tickets/1000").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reserve_redirects_to_whatsapp_deep_link() {
    let server = setup().await;

    let response = server.post("/api/tickets/42/reserve").json(&ana()).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

    let location = response.header("location");
    let location = location.to_str().expect("location header");
    assert!(location.starts_with("https://wa.me/15550000000?text="));
    assert!(location.contains("%2A42%2A")); // ticket number, bolded
    assert!(location.contains("ana%40x.com"));

    let ticket: Value = server.get("/api/tickets/42").await.json();
    assert_eq!(ticket["status"], "reserved");
    assert!(!ticket["reserved_at"].is_null());
    assert!(!ticket["participant_id"].is_null());
}

#[tokio::test]
async fn reserve_conflicts_are_distinct_from_unknown_tickets() {
    let server = setup().await;

    let first = server.post("/api/tickets/42/reserve").json(&ana()).await;
    assert_eq!(first.status_code(), StatusCode::SEE_OTHER);

    // Taken ticket: 409, a user-visible warning.
    let taken = server.post("/api/tickets/42/reserve").json(&ana()).await;
    assert_eq!(taken.status_code(), StatusCode::CONFLICT);
    let body: Value = taken.json();
    assert_eq!(body["code"], "CONFLICT");

    // Unknown ticket: 404.
    let unknown = server.post("/api/tickets/1000/reserve").json(&ana()).await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_reject_bad_secret() {
    let server = setup().await;

    let response = server.get("/api/admin/wrong-code/reservations").await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    // No hint about valid codes in the body.
    assert!(!body["message"]
        .as_str()
        .expect("message")
        .contains(ADMIN_CODE));
}

#[tokio::test]
async fn admin_reviews_and_confirms_reservations() {
    let server = setup().await;
    server.post("/api/tickets/42/reserve").json(&ana()).await;

    // Review: one pending reservation with the participant attached.
    let review = server
        .get(&format!("/api/admin/{ADMIN_CODE}/reservations"))
        .await;
    assert_eq!(review.status_code(), StatusCode::OK);
    let entries: Vec<Value> = review.json();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["ticket"]["number"], 42);
    assert_eq!(entries[0]["participant"]["email"], "ana@x.com");

    // Confirm the sale.
    let ticket_id = entries[0]["ticket"]["id"].as_str().expect("id").to_string();
    let confirm = server
        .post(&format!("/api/admin/{ADMIN_CODE}/tickets/{ticket_id}/confirm"))
        .await;
    assert_eq!(confirm.status_code(), StatusCode::OK);
    let sold: Value = confirm.json();
    assert_eq!(sold["status"], "sold");
    assert!(!sold["participant_id"].is_null());

    // Sold is terminal: confirming again conflicts.
    let again = server
        .post(&format!("/api/admin/{ADMIN_CODE}/tickets/{ticket_id}/confirm"))
        .await;
    assert_eq!(again.status_code(), StatusCode::CONFLICT);

    // And the review queue is empty again.
    let review: Vec<Value> = server
        .get(&format!("/api/admin/{ADMIN_CODE}/reservations"))
        .await
        .json();
    assert!(review.is_empty());
}

#[tokio::test]
async fn confirm_unknown_ticket_is_not_found() {
    let server = setup().await;
    let response = server
        .post(&format!(
            "/api/admin/{ADMIN_CODE}/tickets/00000000-0000-0000-0000-000000000000/confirm"
        ))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
