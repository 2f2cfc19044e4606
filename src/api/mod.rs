//! HTTP handlers, thin adapters over the lifecycle engine and the store.

pub mod admin;
pub mod tickets;
