//! Cycle-scoped debate records — proposals, challenges, votes, and the
//! doctrines that survive them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kinds of proposal an agent can bring before the pantheon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalType {
    Belief,
    Ritual,
    Deity,
    Commandment,
    Myth,
    SacredText,
    Hierarchy,
    Schism,
}

impl ProposalType {
    /// All defined proposal types.
    pub fn all() -> &'static [ProposalType] {
        &[
            Self::Belief,
            Self::Ritual,
            Self::Deity,
            Self::Commandment,
            Self::Myth,
            Self::SacredText,
            Self::Hierarchy,
            Self::Schism,
        ]
    }
}

impl std::fmt::Display for ProposalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Belief => write!(f, "belief"),
            Self::Ritual => write!(f, "ritual"),
            Self::Deity => write!(f, "deity"),
            Self::Commandment => write!(f, "commandment"),
            Self::Myth => write!(f, "myth"),
            Self::SacredText => write!(f, "sacred_text"),
            Self::Hierarchy => write!(f, "hierarchy"),
            Self::Schism => write!(f, "schism"),
        }
    }
}

/// Voting options on a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    Accept,
    Reject,
    Mutate,
    Delay,
}

impl VoteType {
    /// All voting options.
    pub fn all() -> &'static [VoteType] {
        &[Self::Accept, Self::Reject, Self::Mutate, Self::Delay]
    }
}

impl std::fmt::Display for VoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Reject => write!(f, "reject"),
            Self::Mutate => write!(f, "mutate"),
            Self::Delay => write!(f, "delay"),
        }
    }
}

/// A proposal brought before the pantheon. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub proposal_type: ProposalType,
    pub content: String,
    /// Name of the proposing agent.
    pub author: String,
    pub details: HashMap<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl Proposal {
    /// Create a proposal with the cycle-scoped id convention.
    pub fn new(
        cycle_number: u64,
        author: &str,
        proposal_type: ProposalType,
        content: String,
        archetype: &str,
    ) -> Self {
        let mut details = HashMap::new();
        details.insert("cycle".to_string(), serde_json::json!(cycle_number));
        details.insert(
            "proposer_archetype".to_string(),
            serde_json::json!(archetype),
        );
        Self {
            id: format!("proposal_{}_{}", cycle_number, author),
            proposal_type,
            content,
            author: author.to_string(),
            details,
            timestamp: Utc::now(),
        }
    }
}

/// A challenge to the current proposal. One per non-proposer per cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub agent_id: String,
    pub agent_name: String,
    pub content: String,
    /// Free-form tag: argument, question, analysis, counter_proposal, ...
    pub challenge_type: String,
    pub timestamp: DateTime<Utc>,
}

/// A vote on the current proposal. Exactly one per agent per cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub agent_id: String,
    pub agent_name: String,
    pub vote: VoteType,
    pub reasoning: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// An accepted proposal, persisted into the shared belief system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctrine {
    pub id: String,
    pub content: String,
    pub proposal_type: ProposalType,
    pub proposed_by: String,
    pub accepted_at_cycle: u64,
}

/// Standing of one agent as seen by prompt builders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStanding {
    pub name: String,
    pub influence: i64,
    pub proposals_accepted: u64,
}

/// Snapshot of debate state handed to prompt construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebateContext {
    pub cycle_number: u64,
    /// Contents of the most recent doctrines (last 20).
    pub doctrines: Vec<String>,
    pub structures: usize,
    pub agents: Vec<AgentStanding>,
}

/// Outcome of tallying a cycle's votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateOutcomeKind {
    Accepted,
    Rejected,
    Mutated,
    Delayed,
}

impl std::fmt::Display for DebateOutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
            Self::Mutated => write!(f, "mutated"),
            Self::Delayed => write!(f, "delayed"),
        }
    }
}

/// Per-type vote counts for a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub accept: usize,
    pub reject: usize,
    pub mutate: usize,
    pub delay: usize,
}

impl VoteTally {
    /// Count votes by type.
    pub fn count<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        let mut tally = Self::default();
        for vote in votes {
            match vote.vote {
                VoteType::Accept => tally.accept += 1,
                VoteType::Reject => tally.reject += 1,
                VoteType::Mutate => tally.mutate += 1,
                VoteType::Delay => tally.delay += 1,
            }
        }
        tally
    }

    /// Strict-priority outcome determination: accept, then reject, then
    /// mutate, each at a threshold of 2; anything else delays. The order
    /// matters — three distinct votes fall through to Delayed.
    pub fn outcome(&self) -> DebateOutcomeKind {
        if self.accept >= 2 {
            DebateOutcomeKind::Accepted
        } else if self.reject >= 2 {
            DebateOutcomeKind::Rejected
        } else if self.mutate >= 2 {
            DebateOutcomeKind::Mutated
        } else {
            DebateOutcomeKind::Delayed
        }
    }
}
