//! Chat relay server: router, handlers and shutdown handling.

mod extract;
mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
