//! Event types broadcast to connected listeners.
//!
//! Every state change the simulation makes is announced through one of
//! these variants. Delivery is best-effort; consumers render them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::debate::types::{DebateOutcomeKind, VoteType};

/// Agent presentation snapshot carried on update events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: String,
    pub name: String,
    pub archetype: String,
    pub position: [f64; 3],
    pub rotation_y: f64,
    pub current_animation: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub glow_intensity: f64,
    pub influence_score: i64,
}

/// All events the simulation broadcasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorldEvent {
    /// A new debate cycle began.
    CycleStart {
        cycle_number: u64,
        timestamp: DateTime<Utc>,
    },

    /// A debate cycle finished.
    CycleEnd {
        cycle_number: u64,
        proposal_type: Option<String>,
        proposer: Option<String>,
        doctrines_count: usize,
        structures_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A debate phase started.
    DebatePhase {
        phase: String,
        duration_secs: u64,
        timestamp: DateTime<Utc>,
    },

    /// The proposer published a proposal.
    Proposal {
        proposal_id: String,
        proposal_type: String,
        content: String,
        proposer: String,
        proposer_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A challenger responded to the current proposal.
    Challenge {
        agent_id: String,
        agent_name: String,
        content: String,
        challenge_type: String,
        timestamp: DateTime<Utc>,
    },

    /// An agent cast its vote.
    Vote {
        agent_id: String,
        agent_name: String,
        vote: VoteType,
        reasoning: String,
        confidence: f64,
        timestamp: DateTime<Utc>,
    },

    /// The cycle outcome was tallied.
    DebateResult {
        outcome: DebateOutcomeKind,
        accept: usize,
        reject: usize,
        mutate: usize,
        delay: usize,
        proposal_id: String,
        proposer: String,
        timestamp: DateTime<Utc>,
    },

    /// An agent moved or changed animation/visuals.
    AgentUpdate {
        agent: AgentSnapshot,
        timestamp: DateTime<Utc>,
    },

    /// An agent shared a thought or observation with the world.
    AgentThought {
        agent_id: String,
        agent_name: String,
        thought: String,
        timestamp: DateTime<Utc>,
    },

    /// An agent took an autonomous action.
    AgentAction {
        agent_id: String,
        agent_name: String,
        action_type: String,
        target: Option<String>,
        content: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// A user's message addressed to an agent.
    ChatMessage {
        user_id: String,
        agent_id: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// An agent's reply to a user.
    ChatResponse {
        agent_id: String,
        agent_name: String,
        user_id: String,
        message: String,
        emotional_state: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// One agent speaking to another.
    AgentChat {
        from_agent: String,
        to_agent: String,
        message: String,
        conversation_id: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// A user joined or left.
    UserPresence {
        user_id: String,
        action: String,
        username: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// A structure appeared in the world.
    StructureSpawn {
        structure: crate::world::Structure,
        timestamp: DateTime<Utc>,
    },
}

impl WorldEvent {
    /// Stable snake_case tag for this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CycleStart { .. } => "cycle_start",
            Self::CycleEnd { .. } => "cycle_end",
            Self::DebatePhase { .. } => "debate_phase",
            Self::Proposal { .. } => "proposal",
            Self::Challenge { .. } => "challenge",
            Self::Vote { .. } => "vote",
            Self::DebateResult { .. } => "debate_result",
            Self::AgentUpdate { .. } => "agent_update",
            Self::AgentThought { .. } => "agent_thought",
            Self::AgentAction { .. } => "agent_action",
            Self::ChatMessage { .. } => "chat_message",
            Self::ChatResponse { .. } => "chat_response",
            Self::AgentChat { .. } => "agent_chat",
            Self::UserPresence { .. } => "user_presence",
            Self::StructureSpawn { .. } => "structure_spawn",
        }
    }

    /// Event timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::CycleStart { timestamp, .. }
            | Self::CycleEnd { timestamp, .. }
            | Self::DebatePhase { timestamp, .. }
            | Self::Proposal { timestamp, .. }
            | Self::Challenge { timestamp, .. }
            | Self::Vote { timestamp, .. }
            | Self::DebateResult { timestamp, .. }
            | Self::AgentUpdate { timestamp, .. }
            | Self::AgentThought { timestamp, .. }
            | Self::AgentAction { timestamp, .. }
            | Self::ChatMessage { timestamp, .. }
            | Self::ChatResponse { timestamp, .. }
            | Self::AgentChat { timestamp, .. }
            | Self::UserPresence { timestamp, .. }
            | Self::StructureSpawn { timestamp, .. } => *timestamp,
        }
    }
}
