//! The fixed roster of debate participants.
//!
//! All three agents are created once at startup and shared between the
//! debate orchestrator, the chat dispatcher, and the autonomy loop. The
//! roster order is the debate rotation order.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::archetype::Archetype;
use super::runtime::AgentRuntimeState;

/// Shared handle to one agent's runtime state.
pub type SharedAgent = Arc<Mutex<AgentRuntimeState>>;

/// Ordered set of the three agents.
#[derive(Clone)]
pub struct AgentRoster {
    agents: Vec<(String, SharedAgent)>,
}

impl AgentRoster {
    /// Create the standard three-agent roster. When a seed is given,
    /// each agent gets a distinct derived seed so their decision streams
    /// differ but stay reproducible.
    pub fn standard(seed: Option<u64>) -> Self {
        let agents = Archetype::all()
            .iter()
            .enumerate()
            .map(|(i, &archetype)| {
                let agent_seed = seed.map(|s| s.wrapping_add(i as u64));
                let state = AgentRuntimeState::new(archetype, agent_seed);
                (state.name.clone(), Arc::new(Mutex::new(state)))
            })
            .collect();
        Self { agents }
    }

    /// Agent names in rotation order.
    pub fn names(&self) -> Vec<String> {
        self.agents.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Look up an agent by name.
    pub fn get(&self, name: &str) -> Option<SharedAgent> {
        self.agents
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, agent)| agent.clone())
    }

    /// Agent at a rotation index.
    pub fn at(&self, index: usize) -> (String, SharedAgent) {
        let (name, agent) = &self.agents[index % self.agents.len()];
        (name.clone(), agent.clone())
    }

    /// Iterate over (name, handle) pairs in rotation order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, SharedAgent)> {
        self.agents.iter()
    }
}
