//! Per-agent autonomous decision engine.
//!
//! Once per polling tick the engine decides whether its agent
//! spontaneously acts. Perception events accumulate desires, desires
//! decay over time, and a cooldown-gated selection turns the strongest
//! surviving desires into at most one concrete action.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info};

use crate::agents::archetype::Archetype;

use super::desire::{ActionType, AutonomousAction, Desire, DesireType};

/// Seconds the agent stays quiet after any action.
const GLOBAL_COOLDOWN_SECS: i64 = 10;
/// Seconds before the same target may be addressed again.
const TARGET_COOLDOWN_SECS: i64 = 30;
/// How many perception events are retained.
const EVENT_BUFFER: usize = 50;
/// Desires at or below this intensity are pruned.
const PRUNE_THRESHOLD: f64 = 0.1;
/// Chance of acting with no desires at all.
const SPONTANEOUS_CHANCE: f64 = 0.1;

/// A world event as perceived by one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PerceivedEvent {
    UserJoined { user_id: String },
    UserMessage { from: String, to: String },
    ProposalAccepted { proposer: String },
    ThoughtShared { author: String },
    StructureCreated,
}

impl PerceivedEvent {
    /// Author of the idea, for events worth challenging.
    fn challengeable_author(&self) -> Option<&str> {
        match self {
            Self::ProposalAccepted { proposer } => Some(proposer),
            Self::ThoughtShared { author } => Some(author),
            _ => None,
        }
    }
}

/// What an agent knows about a peer at a glance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeerState {
    pub name: String,
    pub is_speaking: bool,
}

/// Per-archetype likelihood of choosing each action type.
fn action_weight(archetype: Archetype, action: ActionType) -> f64 {
    let table: &[(ActionType, f64)] = match archetype {
        Archetype::Order => &[
            (ActionType::InitiateChat, 0.6),
            (ActionType::ShareThought, 0.8),
            (ActionType::MakeObservation, 0.7),
            (ActionType::ProposeTopic, 0.9),
            (ActionType::CreateInWorld, 0.7),
            (ActionType::ChallengeIdea, 0.5),
            (ActionType::ExpressEmotion, 0.3),
        ],
        Archetype::Logic => &[
            (ActionType::InitiateChat, 0.5),
            (ActionType::ShareThought, 0.7),
            (ActionType::MakeObservation, 0.9),
            (ActionType::ProposeTopic, 0.8),
            (ActionType::CreateInWorld, 0.6),
            (ActionType::ChallengeIdea, 0.9),
            (ActionType::ExpressEmotion, 0.2),
        ],
        Archetype::Chaos => &[
            (ActionType::InitiateChat, 0.9),
            (ActionType::ShareThought, 0.7),
            (ActionType::MakeObservation, 0.5),
            (ActionType::ProposeTopic, 0.6),
            (ActionType::CreateInWorld, 0.9),
            (ActionType::ChallengeIdea, 0.8),
            (ActionType::ExpressEmotion, 0.9),
        ],
    };
    table
        .iter()
        .find(|(a, _)| *a == action)
        .map(|(_, w)| *w)
        .unwrap_or(0.5)
}

/// Candidate actions each desire can convert into.
fn candidate_actions(desire_type: DesireType) -> &'static [ActionType] {
    match desire_type {
        DesireType::Curiosity => &[ActionType::InitiateChat, ActionType::MakeObservation],
        DesireType::Social => &[ActionType::InitiateChat, ActionType::ShareThought],
        DesireType::Expression => &[ActionType::ShareThought, ActionType::ExpressEmotion],
        DesireType::Influence => &[ActionType::ProposeTopic, ActionType::CreateInWorld],
        DesireType::Observation => &[ActionType::MakeObservation],
        DesireType::Challenge => &[ActionType::ChallengeIdea, ActionType::InitiateChat],
        DesireType::Creation => &[ActionType::CreateInWorld],
        DesireType::Reflection => &[ActionType::ShareThought],
    }
}

/// Autonomous decision state for one agent.
#[derive(Debug)]
pub struct AutonomyEngine {
    agent_name: String,
    archetype: Archetype,
    desires: Vec<Desire>,

    aware_of_users: Vec<String>,
    aware_of_agents: HashMap<String, PeerState>,
    recent_events: VecDeque<PerceivedEvent>,

    last_interaction_with: HashMap<String, DateTime<Utc>>,
    global_action_cooldown: DateTime<Utc>,

    rng: StdRng,
}

impl AutonomyEngine {
    /// Create an engine seeded from entropy.
    pub fn new(agent_name: &str, archetype: Archetype) -> Self {
        Self::with_rng(agent_name, archetype, StdRng::from_entropy())
    }

    /// Create an engine with a caller-controlled RNG.
    pub fn with_rng(agent_name: &str, archetype: Archetype, rng: StdRng) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            archetype,
            desires: Vec::new(),
            aware_of_users: Vec::new(),
            aware_of_agents: HashMap::new(),
            recent_events: VecDeque::new(),
            last_interaction_with: HashMap::new(),
            global_action_cooldown: Utc::now(),
            rng,
        }
    }

    /// Current desires, in insertion order.
    pub fn desires(&self) -> &[Desire] {
        &self.desires
    }

    /// Add a new desire.
    pub fn add_desire(
        &mut self,
        desire_type: DesireType,
        intensity: f64,
        target: Option<String>,
        reason: Option<String>,
    ) {
        debug!(
            agent = %self.agent_name,
            desire = %desire_type,
            intensity,
            "gained desire"
        );
        self.desires
            .push(Desire::new(desire_type, intensity, target, reason));
    }

    /// Merge newly seen users/peers and process a batch of events.
    ///
    /// A small fixed decay (0.1h) runs after every update so stale
    /// desires fade even when nothing new happens.
    pub fn update_awareness(
        &mut self,
        users: &[String],
        agents: &HashMap<String, PeerState>,
        events: &[PerceivedEvent],
    ) {
        for user in users {
            if !self.aware_of_users.contains(user) {
                self.aware_of_users.push(user.clone());
                self.add_desire(
                    DesireType::Curiosity,
                    0.7,
                    Some(user.clone()),
                    Some("New presence detected".to_string()),
                );
            }
        }

        for (name, state) in agents {
            if name == &self.agent_name {
                continue;
            }
            let was_speaking = self
                .aware_of_agents
                .get(name)
                .map(|prev| prev.is_speaking)
                .unwrap_or(false);
            if state.is_speaking && !was_speaking {
                self.add_desire(
                    DesireType::Observation,
                    0.5,
                    Some(name.clone()),
                    Some(format!("{} is speaking", state.name)),
                );
            }
            self.aware_of_agents.insert(name.clone(), state.clone());
        }

        for event in events {
            self.process_event(event);
            self.recent_events.push_back(event.clone());
        }
        while self.recent_events.len() > EVENT_BUFFER {
            self.recent_events.pop_front();
        }

        self.decay_desires(0.1);
    }

    fn process_event(&mut self, event: &PerceivedEvent) {
        match event {
            PerceivedEvent::ProposalAccepted { proposer } => {
                if proposer != &self.agent_name && self.rng.gen::<f64>() < 0.3 {
                    self.add_desire(
                        DesireType::Social,
                        0.6,
                        Some(proposer.clone()),
                        Some("Acknowledge their proposal".to_string()),
                    );
                }
            }
            PerceivedEvent::StructureCreated => {
                self.add_desire(
                    DesireType::Observation,
                    0.4,
                    None,
                    Some("New structure appeared".to_string()),
                );
            }
            PerceivedEvent::UserMessage { from, to } => {
                if to == &self.agent_name || to == "all" {
                    self.add_desire(
                        DesireType::Social,
                        0.9,
                        Some(from.clone()),
                        Some("User addressed me".to_string()),
                    );
                }
            }
            PerceivedEvent::UserJoined { .. } | PerceivedEvent::ThoughtShared { .. } => {}
        }
    }

    /// Decay all desires and prune the spent ones.
    pub fn decay_desires(&mut self, hours: f64) {
        for desire in &mut self.desires {
            desire.decay(hours);
        }
        self.desires.retain(|d| d.intensity > PRUNE_THRESHOLD);
    }

    /// Whether the agent may act right now, optionally toward a target.
    pub fn can_act(&self, target: Option<&str>) -> bool {
        let now = Utc::now();
        if now < self.global_action_cooldown {
            return false;
        }
        if let Some(target) = target {
            if let Some(last) = self.last_interaction_with.get(target) {
                if now - *last < Duration::seconds(TARGET_COOLDOWN_SECS) {
                    return false;
                }
            }
        }
        true
    }

    /// Decide whether to take an autonomous action this tick.
    ///
    /// "No action" is the normal case, never an error.
    pub fn decide_action(&mut self) -> Option<AutonomousAction> {
        if !self.can_act(None) {
            return None;
        }

        if self.desires.is_empty() {
            if self.rng.gen::<f64>() < SPONTANEOUS_CHANCE {
                return self.spontaneous_action();
            }
            return None;
        }

        let mut order: Vec<usize> = (0..self.desires.len()).collect();
        order.sort_by(|&a, &b| {
            self.desires[b]
                .intensity
                .partial_cmp(&self.desires[a].intensity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for &idx in order.iter().take(3) {
            let desire = self.desires[idx].clone();
            if let Some(action) = self.desire_to_action(&desire) {
                let now = Utc::now();
                self.global_action_cooldown = now + Duration::seconds(GLOBAL_COOLDOWN_SECS);
                if let Some(target) = &action.target {
                    self.last_interaction_with.insert(target.clone(), now);
                }
                self.desires[idx].intensity *= 0.5;

                info!(
                    agent = %self.agent_name,
                    action = %action.action_type,
                    target = action.target.as_deref().unwrap_or("world"),
                    "decided to act"
                );
                return Some(action);
            }
        }

        None
    }

    /// Convert a desire into a concrete action, if personality allows.
    fn desire_to_action(&mut self, desire: &Desire) -> Option<AutonomousAction> {
        let action_type = self.select_action_type(desire.desire_type)?;

        match action_type {
            ActionType::InitiateChat => self.chat_action(desire),
            ActionType::ShareThought => Some(self.thought_action(desire)),
            ActionType::MakeObservation => {
                let mut action = AutonomousAction::new(ActionType::MakeObservation);
                action.content = Some(format!(
                    "*observes {} with interest*",
                    desire.target.as_deref().unwrap_or("the world")
                ));
                action.triggered_by = Some(desire.desire_type);
                Some(action)
            }
            ActionType::ChallengeIdea => self.challenge_action(desire),
            ActionType::ExpressEmotion => Some(self.emotion_action(desire)),
            _ => None,
        }
    }

    /// Pick an action type for a desire via per-candidate Bernoulli
    /// trials weighted by personality, then a uniform pick among passers.
    fn select_action_type(&mut self, desire_type: DesireType) -> Option<ActionType> {
        let mut passed = Vec::new();
        for &candidate in candidate_actions(desire_type) {
            let weight = action_weight(self.archetype, candidate);
            if self.rng.gen::<f64>() < weight {
                passed.push(candidate);
            }
        }
        if passed.is_empty() {
            return None;
        }
        let pick = self.rng.gen_range(0..passed.len());
        Some(passed[pick])
    }

    fn chat_action(&mut self, desire: &Desire) -> Option<AutonomousAction> {
        let target = match &desire.target {
            Some(target) => target.clone(),
            None => {
                if !self.aware_of_users.is_empty() {
                    let pick = self.rng.gen_range(0..self.aware_of_users.len());
                    self.aware_of_users[pick].clone()
                } else if !self.aware_of_agents.is_empty() {
                    let names: Vec<&String> = self.aware_of_agents.keys().collect();
                    let pick = self.rng.gen_range(0..names.len());
                    names[pick].clone()
                } else {
                    return None;
                }
            }
        };

        if !self.can_act(Some(&target)) {
            return None;
        }

        let mut action = AutonomousAction::new(ActionType::InitiateChat);
        action.target = Some(target);
        if let Some(reason) = &desire.reason {
            action
                .metadata
                .insert("reason".to_string(), serde_json::json!(reason));
        }
        action.priority = desire.intensity;
        action.triggered_by = Some(desire.desire_type);
        Some(action)
    }

    fn thought_action(&mut self, desire: &Desire) -> AutonomousAction {
        let mut action = AutonomousAction::new(ActionType::ShareThought);
        action.target = Some("world".to_string());
        action.metadata.insert(
            "topics".to_string(),
            serde_json::json!(self.archetype.favorite_topics()),
        );
        if let Some(reason) = &desire.reason {
            action
                .metadata
                .insert("reason".to_string(), serde_json::json!(reason));
        }
        action.priority = desire.intensity;
        action.triggered_by = Some(desire.desire_type);
        action
    }

    fn challenge_action(&mut self, desire: &Desire) -> Option<AutonomousAction> {
        let challengeable: Vec<&PerceivedEvent> = self
            .recent_events
            .iter()
            .filter(|e| e.challengeable_author().is_some())
            .collect();
        if challengeable.is_empty() {
            return None;
        }

        let pick = self.rng.gen_range(0..challengeable.len());
        let event = challengeable[pick].clone();

        let mut action = AutonomousAction::new(ActionType::ChallengeIdea);
        action.target = event.challengeable_author().map(str::to_string);
        action
            .metadata
            .insert("regarding".to_string(), serde_json::json!(event));
        action.priority = desire.intensity;
        action.triggered_by = Some(desire.desire_type);
        Some(action)
    }

    fn emotion_action(&mut self, desire: &Desire) -> AutonomousAction {
        let expressions = self.archetype.emotion_expressions();
        let pick = self.rng.gen_range(0..expressions.len());

        let mut action = AutonomousAction::new(ActionType::ExpressEmotion);
        action.content = Some(expressions[pick].to_string());
        action.target = Some("world".to_string());
        action.priority = desire.intensity;
        action.triggered_by = Some(desire.desire_type);
        action
    }

    /// Weighted-random action with no driving desire. Only thoughts and
    /// observations come out of thin air.
    fn spontaneous_action(&mut self) -> Option<AutonomousAction> {
        let action_types = ActionType::all();
        let weights: Vec<f64> = action_types
            .iter()
            .map(|&a| action_weight(self.archetype, a))
            .collect();
        let total: f64 = weights.iter().sum();
        let roll = self.rng.gen::<f64>() * total;

        let mut cumulative = 0.0;
        for (&action_type, &weight) in action_types.iter().zip(weights.iter()) {
            cumulative += weight;
            if roll <= cumulative {
                return match action_type {
                    ActionType::ShareThought => {
                        let mut action = AutonomousAction::new(ActionType::ShareThought);
                        action.target = Some("world".to_string());
                        action
                            .metadata
                            .insert("spontaneous".to_string(), serde_json::json!(true));
                        Some(action)
                    }
                    ActionType::MakeObservation => {
                        let mut action = AutonomousAction::new(ActionType::MakeObservation);
                        action.content =
                            Some("*gazes contemplatively at the realm*".to_string());
                        action.triggered_by = Some(DesireType::Reflection);
                        Some(action)
                    }
                    _ => None,
                };
            }
        }

        None
    }
}
