//! Poll cycle that gates, renders and delivers wall posts.

mod gate;
mod poller;

pub use gate::{evaluate, DeliveryDecision};
pub use poller::{CycleReport, Relay};
