//! Autonomous action decision subsystem.
//!
//! Agents act outside the scripted debate cycle: perception events feed
//! desires, desires decay, and a cooldown-gated engine occasionally turns
//! the strongest desire into a concrete action.

pub mod desire;
pub mod engine;

pub use desire::{ActionType, AutonomousAction, Desire, DesireType};
pub use engine::{AutonomyEngine, PeerState, PerceivedEvent};
