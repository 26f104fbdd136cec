//! Hub: the single coordinating loop that owns room membership and fan-out.
//!
//! - `runner`: the loop itself
//! - `handle`: cloneable [`HubHandle`] implementing [`crate::domain::ChatHub`]
//! - `registry` / `room`: the state the loop owns
//! - `config` / `metrics`: tuning knobs and counters

mod config;
mod handle;
mod metrics;
mod registry;
mod room;
mod runner;

pub use config::{HubConfig, OverflowPolicy};
pub use handle::HubHandle;
pub use metrics::HubMetricsSnapshot;
pub use runner::Hub;
