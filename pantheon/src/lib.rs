//! Pantheon — a standing debate between three AI personas.
//!
//! Three fixed archetypes (Axioma/order, Veridicus/logic,
//! Paradoxia/chaos) evolve a shared belief system through an endless
//! debate cycle, act on their own desires between cycles, and broadcast
//! every state change to connected listeners.
//!
//! # Components
//!
//! - [`debate`]: the cycle state machine — proposal, challenge, voting,
//!   result, world update.
//! - [`autonomy`]: per-agent desire accumulation and cooldown-gated
//!   action selection.
//! - [`agents`]: archetype tables, evaluation policies, prompt builders,
//!   and per-agent runtime state.
//! - [`chat`]: user/agent message routing and the autonomy polling loop.
//! - [`events`]: the typed broadcast bus.
//! - [`llm`]: the text-generation collaborator seam.
//! - [`memory`]: importance-scored interaction memory.
//! - [`world`]: structure records and spiral placement.

#![allow(clippy::uninlined_format_args)]

pub mod agents;
pub mod autonomy;
pub mod chat;
pub mod config;
pub mod debate;
pub mod events;
pub mod llm;
pub mod memory;
pub mod world;

// Re-export the types most callers wire together at startup.
pub use agents::{AgentRoster, Archetype, SharedAgent};
pub use chat::ChatDispatcher;
pub use config::Settings;
pub use debate::{
    DebateOrchestrator, DebateOutcomeKind, DebateTimings, Doctrine, Proposal, ProposalType,
    VoteTally, VoteType,
};
pub use events::{EventBus, SharedEventBus, WorldEvent};
pub use llm::{CannedGenerator, ClaudeClient, LlmError, TextGenerator};
pub use world::{Structure, WorldState};
