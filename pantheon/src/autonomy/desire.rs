//! Desires and the actions they can produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Motivations that can drive an agent to act on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesireType {
    /// Want to learn/explore.
    Curiosity,
    /// Want to interact.
    Social,
    /// Want to share thoughts.
    Expression,
    /// Want to affect the world.
    Influence,
    /// Want to watch/understand.
    Observation,
    /// Want to debate/argue.
    Challenge,
    /// Want to build/make.
    Creation,
    /// Want to think internally.
    Reflection,
}

impl std::fmt::Display for DesireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Curiosity => write!(f, "curiosity"),
            Self::Social => write!(f, "social"),
            Self::Expression => write!(f, "expression"),
            Self::Influence => write!(f, "influence"),
            Self::Observation => write!(f, "observation"),
            Self::Challenge => write!(f, "challenge"),
            Self::Creation => write!(f, "creation"),
            Self::Reflection => write!(f, "reflection"),
        }
    }
}

/// Autonomous actions an agent can take outside the debate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    InitiateChat,
    RespondToPresence,
    MakeObservation,
    ShareThought,
    ProposeTopic,
    CreateInWorld,
    ChallengeIdea,
    ExpressEmotion,
}

impl ActionType {
    /// All defined action types.
    pub fn all() -> &'static [ActionType] {
        &[
            Self::InitiateChat,
            Self::RespondToPresence,
            Self::MakeObservation,
            Self::ShareThought,
            Self::ProposeTopic,
            Self::CreateInWorld,
            Self::ChallengeIdea,
            Self::ExpressEmotion,
        ]
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InitiateChat => write!(f, "initiate_chat"),
            Self::RespondToPresence => write!(f, "respond_to_presence"),
            Self::MakeObservation => write!(f, "make_observation"),
            Self::ShareThought => write!(f, "share_thought"),
            Self::ProposeTopic => write!(f, "propose_topic"),
            Self::CreateInWorld => write!(f, "create_in_world"),
            Self::ChallengeIdea => write!(f, "challenge_idea"),
            Self::ExpressEmotion => write!(f, "express_emotion"),
        }
    }
}

/// A motivating desire. Owned by one agent's autonomy state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Desire {
    pub desire_type: DesireType,
    /// 0.0 to 1.0; decays toward 0 over time.
    pub intensity: f64,
    /// Entity or topic this desire is aimed at.
    pub target: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Desire {
    pub fn new(
        desire_type: DesireType,
        intensity: f64,
        target: Option<String>,
        reason: Option<String>,
    ) -> Self {
        Self {
            desire_type,
            intensity,
            target,
            reason,
            created_at: Utc::now(),
        }
    }

    /// Linear decay: 0.1 intensity per hour, floored at zero.
    pub fn decay(&mut self, hours: f64) {
        self.intensity = (self.intensity - 0.1 * hours).max(0.0);
    }
}

/// An action the agent decided to take. Transient — consumed by the
/// dispatcher, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutonomousAction {
    pub action_type: ActionType,
    /// Agent name, user id, or "world".
    pub target: Option<String>,
    pub content: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub priority: f64,
    pub triggered_by: Option<DesireType>,
}

impl AutonomousAction {
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            target: None,
            content: None,
            metadata: HashMap::new(),
            priority: 0.5,
            triggered_by: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_is_linear() {
        let mut desire = Desire::new(DesireType::Curiosity, 0.7, None, None);
        desire.decay(2.0);
        assert!((desire.intensity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_decay_floors_at_zero() {
        let mut desire = Desire::new(DesireType::Social, 0.3, None, None);
        desire.decay(10.0);
        assert_eq!(desire.intensity, 0.0);
    }

    #[test]
    fn test_display_tags() {
        assert_eq!(DesireType::Curiosity.to_string(), "curiosity");
        assert_eq!(ActionType::ShareThought.to_string(), "share_thought");
        assert_eq!(ActionType::ChallengeIdea.to_string(), "challenge_idea");
    }
}
