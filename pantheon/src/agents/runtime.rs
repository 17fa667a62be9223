//! Runtime state for one agent — identity, traits, relationships,
//! influence, presentation, and the attached autonomy/memory systems.
//!
//! One instance per archetype is created at process start and lives for
//! the process lifetime.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

use crate::autonomy::AutonomyEngine;
use crate::events::AgentSnapshot;
use crate::memory::{EmotionalState, InteractionMemory};

use super::archetype::Archetype;

/// Standing with one peer, updated after every vote aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// -1.0 to 1.0
    pub trust_score: f64,
    /// alliances / (alliances + conflicts)
    pub agreement_rate: f64,
    pub total_interactions: u64,
    pub alliances: u64,
    pub conflicts: u64,
}

impl Default for Relationship {
    fn default() -> Self {
        Self {
            trust_score: 0.0,
            agreement_rate: 0.5,
            total_interactions: 0,
            alliances: 0,
            conflicts: 0,
        }
    }
}

/// One line of debate history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateRecord {
    pub cycle: u64,
    pub proposal_type: String,
    pub content_preview: String,
    pub accepted: bool,
    pub timestamp: chrono::DateTime<Utc>,
}

/// Full runtime state of one agent.
#[derive(Debug)]
pub struct AgentRuntimeState {
    pub id: String,
    pub name: String,
    pub archetype: Archetype,

    // Presentation
    pub primary_color: String,
    pub secondary_color: String,
    pub glow_intensity: f64,
    pub position: [f64; 3],
    pub rotation_y: f64,
    pub current_animation: String,

    /// Personality traits, each 0.0 to 1.0.
    pub traits: BTreeMap<String, f64>,
    /// Behavioral temperature for the chaos archetype, 0.0 to 2.0.
    pub chaos_level: f64,

    pub relationships: HashMap<String, Relationship>,
    pub debate_history: Vec<DebateRecord>,

    pub influence_score: i64,
    pub proposals_made: u64,
    pub proposals_accepted: u64,

    pub emotional_state: EmotionalState,

    pub autonomy: AutonomyEngine,
    pub memory: InteractionMemory,
}

impl AgentRuntimeState {
    /// Create the runtime state for an archetype, seeding its decision
    /// RNG from `seed` when given.
    pub fn new(archetype: Archetype, seed: Option<u64>) -> Self {
        let name = archetype.agent_name().to_string();
        let id = uuid::Uuid::new_v4().to_string();
        let (primary, secondary) = archetype.colors();
        let traits = archetype
            .base_traits()
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(agent = %name, archetype = %archetype, "initialized agent");

        Self {
            autonomy: AutonomyEngine::with_rng(&name, archetype, rng),
            memory: InteractionMemory::new(&name),
            id,
            name,
            archetype,
            primary_color: primary.to_string(),
            secondary_color: secondary.to_string(),
            glow_intensity: archetype.glow_intensity(),
            position: archetype.home_position(),
            rotation_y: 0.0,
            current_animation: "idle".to_string(),
            traits,
            chaos_level: 1.0,
            relationships: HashMap::new(),
            debate_history: Vec::new(),
            influence_score: 100,
            proposals_made: 0,
            proposals_accepted: 0,
            emotional_state: EmotionalState::Neutral,
        }
    }

    /// Personality trait lookup; unknown traits read as 0.5.
    pub fn trait_value(&self, name: &str) -> f64 {
        self.traits.get(name).copied().unwrap_or(0.5)
    }

    /// Nudge a trait, clamped to [0, 1]. Unknown traits are ignored.
    pub fn modify_trait(&mut self, name: &str, delta: f64) {
        if let Some(value) = self.traits.get_mut(name) {
            *value = (*value + delta).clamp(0.0, 1.0);
        }
    }

    /// Move to a target position.
    pub fn move_to(&mut self, x: f64, y: f64, z: f64) {
        self.position = [x, y, z];
    }

    /// Set the current animation tag.
    pub fn set_animation(&mut self, animation: &str) {
        self.current_animation = animation.to_string();
    }

    /// Send the agent back to its home station, idle.
    pub fn return_home(&mut self) {
        self.position = self.archetype.home_position();
        self.set_animation("idle");
    }

    /// Update standing with a peer after comparing votes.
    ///
    /// Agreement raises trust by 0.1 and counts an alliance;
    /// disagreement lowers trust by 0.05 and counts a conflict.
    pub fn update_relationship(&mut self, other_agent: &str, agreed: bool) {
        let rel = self
            .relationships
            .entry(other_agent.to_string())
            .or_default();
        rel.total_interactions += 1;

        if agreed {
            rel.trust_score = (rel.trust_score + 0.1).min(1.0);
            rel.alliances += 1;
        } else {
            rel.trust_score = (rel.trust_score - 0.05).max(-1.0);
            rel.conflicts += 1;
        }

        let total = rel.alliances + rel.conflicts;
        if total > 0 {
            rel.agreement_rate = rel.alliances as f64 / total as f64;
        }
    }

    /// Trust in a peer; zero for strangers.
    pub fn trust_in(&self, other_agent: &str) -> f64 {
        self.relationships
            .get(other_agent)
            .map(|r| r.trust_score)
            .unwrap_or(0.0)
    }

    /// Record whether this agent's proposal was accepted.
    pub fn record_proposal_outcome(
        &mut self,
        cycle: u64,
        proposal_type: &str,
        content: &str,
        accepted: bool,
    ) {
        if accepted {
            self.proposals_accepted += 1;
            self.influence_score += 10;
        } else {
            self.influence_score = (self.influence_score - 5).max(0);
        }

        let content_preview: String = content.chars().take(100).collect();
        self.debate_history.push(DebateRecord {
            cycle,
            proposal_type: proposal_type.to_string(),
            content_preview,
            accepted,
            timestamp: Utc::now(),
        });
    }

    /// Re-derive emotional state from a conversation turn.
    ///
    /// Keyword scan over input + response; curiosity outranks the
    /// positive/negative cues.
    pub fn update_emotional_state(&mut self, input_text: &str, response_text: &str) {
        const POSITIVE: &[&str] = &[
            "thank", "great", "wonderful", "agree", "yes", "beautiful", "amazing",
        ];
        const NEGATIVE: &[&str] = &[
            "wrong", "disagree", "no", "bad", "terrible", "hate", "stupid",
        ];
        const CURIOUS: &[&str] = &[
            "why", "how", "what", "explain", "tell me", "curious", "interesting",
        ];

        let combined = format!("{} {}", input_text, response_text).to_lowercase();

        self.emotional_state = if CURIOUS.iter().any(|kw| combined.contains(kw)) {
            EmotionalState::Curious
        } else if POSITIVE.iter().any(|kw| combined.contains(kw)) {
            EmotionalState::Pleased
        } else if NEGATIVE.iter().any(|kw| combined.contains(kw)) {
            EmotionalState::Concerned
        } else {
            EmotionalState::Neutral
        };
    }

    /// Presentation snapshot for broadcast.
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            archetype: self.archetype.to_string(),
            position: self.position,
            rotation_y: self.rotation_y,
            current_animation: self.current_animation.clone(),
            primary_color: self.primary_color.clone(),
            secondary_color: self.secondary_color.clone(),
            glow_intensity: self.glow_intensity,
            influence_score: self.influence_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_agent_defaults() {
        let agent = AgentRuntimeState::new(Archetype::Order, Some(1));
        assert_eq!(agent.name, "Axioma");
        assert_eq!(agent.influence_score, 100);
        assert_eq!(agent.position, [-15.0, 0.0, 0.0]);
        assert!((agent.trait_value("certainty") - 0.9).abs() < 1e-9);
        assert!((agent.trait_value("unknown") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_relationship_agreement_and_conflict() {
        let mut agent = AgentRuntimeState::new(Archetype::Logic, Some(2));

        agent.update_relationship("Axioma", true);
        agent.update_relationship("Axioma", true);
        let rel = &agent.relationships["Axioma"];
        assert_eq!(rel.alliances, 2);
        assert!((rel.trust_score - 0.2).abs() < 1e-9);
        assert!((rel.agreement_rate - 1.0).abs() < 1e-9);

        agent.update_relationship("Axioma", false);
        let rel = &agent.relationships["Axioma"];
        assert_eq!(rel.conflicts, 1);
        assert!((rel.trust_score - 0.15).abs() < 1e-9);
        assert!((rel.agreement_rate - (2.0 / 3.0)).abs() < 1e-9);
        assert_eq!(rel.total_interactions, 3);
    }

    #[test]
    fn test_trust_clamps() {
        let mut agent = AgentRuntimeState::new(Archetype::Logic, Some(3));
        for _ in 0..20 {
            agent.update_relationship("Paradoxia", true);
        }
        assert!((agent.trust_in("Paradoxia") - 1.0).abs() < 1e-9);

        for _ in 0..60 {
            agent.update_relationship("Paradoxia", false);
        }
        assert!((agent.trust_in("Paradoxia") + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_proposal_outcome_bookkeeping() {
        let mut agent = AgentRuntimeState::new(Archetype::Chaos, Some(4));

        agent.record_proposal_outcome(1, "myth", "a strange tale", true);
        assert_eq!(agent.proposals_accepted, 1);
        assert_eq!(agent.influence_score, 110);

        agent.record_proposal_outcome(2, "schism", "split it all", false);
        assert_eq!(agent.proposals_accepted, 1);
        assert_eq!(agent.influence_score, 105);
        assert_eq!(agent.debate_history.len(), 2);
    }

    #[test]
    fn test_influence_floors_at_zero() {
        let mut agent = AgentRuntimeState::new(Archetype::Order, Some(5));
        agent.influence_score = 3;
        agent.record_proposal_outcome(1, "belief", "rejected", false);
        assert_eq!(agent.influence_score, 0);
    }

    #[test]
    fn test_trait_modification_clamps() {
        let mut agent = AgentRuntimeState::new(Archetype::Chaos, Some(6));
        agent.modify_trait("playful", 0.5);
        assert!((agent.trait_value("playful") - 1.0).abs() < 1e-9);
        agent.modify_trait("disruptive", -2.0);
        assert_eq!(agent.trait_value("disruptive"), 0.0);
    }

    #[test]
    fn test_emotional_state_priority() {
        let mut agent = AgentRuntimeState::new(Archetype::Logic, Some(7));

        agent.update_emotional_state("why is this so?", "a fine question");
        assert_eq!(agent.emotional_state, EmotionalState::Curious);

        agent.update_emotional_state("that was wonderful", "indeed");
        assert_eq!(agent.emotional_state, EmotionalState::Pleased);

        agent.update_emotional_state("this is terrible", "regrettable");
        assert_eq!(agent.emotional_state, EmotionalState::Concerned);

        agent.update_emotional_state("the sky exists", "it does");
        assert_eq!(agent.emotional_state, EmotionalState::Neutral);
    }

    #[test]
    fn test_return_home() {
        let mut agent = AgentRuntimeState::new(Archetype::Chaos, Some(8));
        agent.move_to(0.0, 0.0, -5.0);
        agent.set_animation("proposing");
        agent.return_home();
        assert_eq!(agent.position, [0.0, 0.0, 15.0]);
        assert_eq!(agent.current_animation, "idle");
    }
}
