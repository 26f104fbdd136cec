//! Hiroba: real-time chat relay.
//!
//! - `domain`: value objects, entities and collaborator traits
//! - `usecase`: admission, messaging, presence and queries
//! - `infrastructure`: hub loop, presence tracker, in-memory stores, DTOs
//! - `ui`: axum router and WebSocket/HTTP handlers
//! - `app`: composition root

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
