//! The three fixed personas and their decision machinery.
//!
//! `archetype` carries the identity tables, `runtime` the per-agent
//! mutable state, `policy` the vote/challenge evaluation rules, and
//! `prompts` the deterministic prompt construction for the LLM seam.

pub mod archetype;
pub mod policy;
pub mod prompts;
pub mod roster;
pub mod runtime;

pub use archetype::Archetype;
pub use roster::{AgentRoster, SharedAgent};
pub use runtime::{AgentRuntimeState, DebateRecord, Relationship};
