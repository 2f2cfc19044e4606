//! End-to-end reservation lifecycle over the in-memory store.
//!
//! Walks the whole story: empty store, bootstrap, reservation, a premature
//! sweep that must not touch anything, expiry, and the sweep that reclaims
//! the ticket while leaving the participant record intact.

#![allow(clippy::expect_used)] // Integration tests can use expect for setup

use chrono::{Duration, Utc};
use raffle::clock::FixedClock;
use raffle::{
    run_sweep, BuyerDetails, InMemoryTicketStore, TicketLifecycle, TicketStatus, TicketStore,
};
use std::sync::Arc;

fn timeout() -> Duration {
    Duration::minutes(120)
}

#[tokio::test]
async fn full_reservation_and_expiry_story() {
    let t0 = Utc::now();
    let store: Arc<dyn TicketStore> = Arc::new(InMemoryTicketStore::new());
    let engine = TicketLifecycle::new(store.clone(), Arc::new(FixedClock(t0)));

    // Empty store → bootstrap(100) → tickets 0..=99, all available.
    assert_eq!(store.ticket_count().await.expect("count"), 0);
    engine.bootstrap(100).await.expect("bootstrap");
    let tickets = store.list_tickets().await.expect("list");
    assert_eq!(tickets.len(), 100);
    assert!(tickets.iter().all(|t| t.status == TicketStatus::Available));

    // Reserve ticket 42 for Ana: a new participant appears.
    let ana = BuyerDetails {
        name: "Ana".to_string(),
        email: "ana@x.com".to_string(),
        phone: "555".to_string(),
    };
    let (ticket, participant) = engine.reserve(42, &ana).await.expect("reserve");
    assert_eq!(ticket.status, TicketStatus::Reserved);
    assert_eq!(participant.name, "Ana");

    // Sweep right away: the timestamp is fresh, nothing changes.
    let outcome = run_sweep(store.as_ref(), timeout(), t0 + Duration::minutes(1))
        .await
        .expect("sweep");
    assert_eq!(outcome.count(), 0);
    let ticket = store
        .ticket_by_number(42)
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(ticket.status, TicketStatus::Reserved);

    // 121 minutes later the reservation has expired.
    let outcome = run_sweep(store.as_ref(), timeout(), t0 + Duration::minutes(121))
        .await
        .expect("sweep");
    assert_eq!(outcome.released, vec![42]);

    let ticket = store
        .ticket_by_number(42)
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(ticket.status, TicketStatus::Available);
    assert!(ticket.reserved_at.is_none());
    assert!(ticket.participant_id.is_none());

    // Ana's record survives the sweep untouched.
    let still_there = store
        .participant_by_email("ana@x.com")
        .await
        .expect("query")
        .expect("participant survives");
    assert_eq!(still_there.id, participant.id);
}

#[tokio::test]
async fn participant_round_trip_by_email() {
    let store: Arc<dyn TicketStore> = Arc::new(InMemoryTicketStore::new());
    let engine = TicketLifecycle::new(store.clone(), Arc::new(FixedClock(Utc::now())));
    engine.bootstrap(100).await.expect("bootstrap");

    let buyer = BuyerDetails {
        name: "B".to_string(),
        email: "a@b.com".to_string(),
        phone: "1".to_string(),
    };
    engine.reserve(7, &buyer).await.expect("reserve");

    let participant = store
        .participant_by_email("a@b.com")
        .await
        .expect("query")
        .expect("exists");
    let owned = store
        .tickets_for_participant(participant.id)
        .await
        .expect("owned");
    assert!(owned.iter().any(|t| t.number == 7));
}
