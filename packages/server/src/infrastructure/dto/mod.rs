//! Data Transfer Objects (DTOs) for the chat relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: frames written to room and presence connections
//! - `http`: HTTP API request/response bodies
//! - `conversion`: domain ⇄ DTO conversions

pub mod conversion;
pub mod http;
pub mod websocket;
