//! Interaction memory — what each agent remembers about who said what.
//!
//! Every chat turn, thought, and observation is recorded with an
//! importance score that drives later recall. Each agent has its own
//! perspective on shared interactions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Kinds of interaction an agent can be part of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    /// User talks to agent.
    UserMessage,
    /// Agent responds to user.
    AgentResponse,
    /// Agent speaks with another agent.
    AgentToAgent,
    /// Agent's internal reflection.
    AgentThought,
    /// Agent acts in the world.
    WorldAction,
    /// Agent observes something.
    Observation,
}

/// Agent emotional states, derived from conversation content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    Neutral,
    Curious,
    Pleased,
    Concerned,
    Excited,
    Contemplative,
    Frustrated,
    Inspired,
}

impl EmotionalState {
    fn is_positive(self) -> bool {
        matches!(
            self,
            Self::Pleased | Self::Excited | Self::Inspired | Self::Curious
        )
    }

    fn is_negative(self) -> bool {
        matches!(self, Self::Frustrated | Self::Concerned)
    }
}

impl std::fmt::Display for EmotionalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Neutral => write!(f, "neutral"),
            Self::Curious => write!(f, "curious"),
            Self::Pleased => write!(f, "pleased"),
            Self::Concerned => write!(f, "concerned"),
            Self::Excited => write!(f, "excited"),
            Self::Contemplative => write!(f, "contemplative"),
            Self::Frustrated => write!(f, "frustrated"),
            Self::Inspired => write!(f, "inspired"),
        }
    }
}

/// A single recorded interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub interaction_type: InteractionType,
    pub from_entity: String,
    pub to_entity: String,
    pub content: String,
    pub emotional_state: Option<EmotionalState>,
    /// 0.0 to 1.0, affects recall priority.
    pub importance: f64,
    pub conversation_id: Option<String>,
}

/// What an agent remembers about one entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityMemory {
    pub total_interactions: u64,
    pub positive_interactions: u64,
    pub last_interaction: Option<DateTime<Utc>>,
    /// -1.0 to 1.0
    pub relationship_sentiment: f64,
}

/// A conversation thread between entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub participants: Vec<String>,
    pub topic: Option<String>,
    pub is_active: bool,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Recall filters for [`InteractionMemory::recall`].
#[derive(Debug, Clone, Default)]
pub struct RecallFilter {
    pub with_entity: Option<String>,
    pub interaction_type: Option<InteractionType>,
    pub min_importance: f64,
    pub time_range_hours: Option<i64>,
    pub limit: usize,
}

impl RecallFilter {
    pub fn latest(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity_id: &str) -> Self {
        self.with_entity = Some(entity_id.to_string());
        self
    }
}

/// One agent's memory of its interactions.
#[derive(Debug, Clone)]
pub struct InteractionMemory {
    agent_id: String,
    interactions: Vec<Interaction>,
    conversations: HashMap<String, Conversation>,
    entity_memories: HashMap<String, EntityMemory>,
    /// Interaction ids flagged for long-term retention.
    important: Vec<String>,
}

impl InteractionMemory {
    pub fn new(agent_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            interactions: Vec::new(),
            conversations: HashMap::new(),
            entity_memories: HashMap::new(),
            important: Vec::new(),
        }
    }

    /// Record a new interaction and update entity memory.
    #[allow(clippy::too_many_arguments)]
    pub fn record_interaction(
        &mut self,
        interaction_type: InteractionType,
        from_entity: &str,
        to_entity: &str,
        content: &str,
        importance: f64,
        emotional_state: Option<EmotionalState>,
        conversation_id: Option<String>,
    ) -> &Interaction {
        let interaction = Interaction {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            interaction_type,
            from_entity: from_entity.to_string(),
            to_entity: to_entity.to_string(),
            content: content.to_string(),
            emotional_state,
            importance,
            conversation_id,
        };

        let other = if from_entity == self.agent_id {
            to_entity
        } else {
            from_entity
        };
        self.update_entity_memory(other, &interaction);

        if importance >= 0.8 {
            self.important.push(interaction.id.clone());
        }

        self.interactions.push(interaction);
        self.interactions.last().unwrap()
    }

    fn update_entity_memory(&mut self, entity_id: &str, interaction: &Interaction) {
        let mem = self.entity_memories.entry(entity_id.to_string()).or_default();
        mem.total_interactions += 1;
        mem.last_interaction = Some(interaction.timestamp);

        if let Some(state) = interaction.emotional_state {
            if state.is_positive() {
                mem.relationship_sentiment = (mem.relationship_sentiment + 0.05).min(1.0);
                mem.positive_interactions += 1;
            } else if state.is_negative() {
                mem.relationship_sentiment = (mem.relationship_sentiment - 0.03).max(-1.0);
            }
        }
    }

    /// Open a new conversation thread.
    pub fn start_conversation(&mut self, participants: Vec<String>, topic: Option<String>) -> String {
        let conv = Conversation {
            id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            participants,
            topic,
            is_active: true,
            ended_at: None,
        };
        let id = conv.id.clone();
        self.conversations.insert(id.clone(), conv);
        id
    }

    /// Close a conversation thread.
    pub fn end_conversation(&mut self, conversation_id: &str) {
        if let Some(conv) = self.conversations.get_mut(conversation_id) {
            conv.is_active = false;
            conv.ended_at = Some(Utc::now());
        }
    }

    /// Recall past interactions, newest first.
    pub fn recall(&self, filter: &RecallFilter) -> Vec<&Interaction> {
        let mut matched: Vec<&Interaction> = self
            .interactions
            .iter()
            .filter(|i| {
                if let Some(entity) = &filter.with_entity {
                    if &i.from_entity != entity && &i.to_entity != entity {
                        return false;
                    }
                }
                if let Some(kind) = filter.interaction_type {
                    if i.interaction_type != kind {
                        return false;
                    }
                }
                if i.importance < filter.min_importance {
                    return false;
                }
                if let Some(hours) = filter.time_range_hours {
                    if i.timestamp < Utc::now() - Duration::hours(hours) {
                        return false;
                    }
                }
                true
            })
            .collect();

        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let limit = if filter.limit == 0 { 10 } else { filter.limit };
        matched.truncate(limit);
        matched
    }

    /// Render past-interaction context about an entity for a prompt.
    pub fn context_for_entity(&self, entity_id: &str) -> String {
        let Some(mem) = self.entity_memories.get(entity_id) else {
            return format!("This is your first interaction with {}.", entity_id);
        };

        let sentiment = if mem.relationship_sentiment > 0.2 {
            "positive"
        } else if mem.relationship_sentiment > -0.2 {
            "neutral"
        } else {
            "negative"
        };

        let mut parts = vec![
            format!("Relationship with {}:", entity_id),
            format!("- Total interactions: {}", mem.total_interactions),
            format!("- Relationship sentiment: {}", sentiment),
        ];

        let recent = self.recall(&RecallFilter::latest(3).with_entity(entity_id));
        if !recent.is_empty() {
            parts.push("\nRecent conversation:".to_string());
            for interaction in recent.iter().rev() {
                let speaker = if interaction.from_entity == self.agent_id {
                    "You"
                } else {
                    &interaction.from_entity
                };
                let preview: String = interaction.content.chars().take(200).collect();
                parts.push(format!("  {}: {}", speaker, preview));
            }
        }

        parts.join("\n")
    }

    pub fn conversation(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.get(conversation_id)
    }

    pub fn entity_memory(&self, entity_id: &str) -> Option<&EntityMemory> {
        self.entity_memories.get(entity_id)
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    pub fn important_count(&self) -> usize {
        self.important.len()
    }
}
