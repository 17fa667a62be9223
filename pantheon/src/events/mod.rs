//! World event vocabulary and the broadcast bus.

pub mod bus;
pub mod types;

pub use bus::{EventBus, SharedEventBus};
pub use types::{AgentSnapshot, WorldEvent};
