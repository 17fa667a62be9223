//! Chat/action dispatch.
//!
//! Routes user messages and agent-to-agent conversations to the LLM
//! collaborator and the broadcast bus, tracks active users and
//! conversations, and runs the autonomy polling loop that lets agents
//! act between debate cycles. LLM failures here degrade to "no reply";
//! they never crash the process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::agents::{prompts, AgentRoster};
use crate::autonomy::{ActionType, AutonomousAction, DesireType, PeerState, PerceivedEvent};
use crate::events::{SharedEventBus, WorldEvent};
use crate::llm::TextGenerator;
use crate::memory::InteractionType;

/// A connected user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatUser {
    pub user_id: String,
    pub username: String,
    pub connected_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

/// Registry entry for an agent-to-agent conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub participants: [String; 2],
    pub topic: Option<String>,
    pub started_at: DateTime<Utc>,
    pub message_count: u64,
}

/// Dispatches chat traffic and autonomous actions.
///
/// Explicitly constructed and handed to callers at startup; there is no
/// ambient global instance.
pub struct ChatDispatcher {
    roster: AgentRoster,
    bus: SharedEventBus,
    llm: Arc<dyn TextGenerator>,

    active_users: Mutex<HashMap<String, ChatUser>>,
    active_conversations: Mutex<HashMap<String, ConversationEntry>>,

    autonomy_running: Arc<AtomicBool>,
}

impl ChatDispatcher {
    pub fn new(roster: AgentRoster, bus: SharedEventBus, llm: Arc<dyn TextGenerator>) -> Self {
        Self {
            roster,
            bus,
            llm,
            active_users: Mutex::new(HashMap::new()),
            active_conversations: Mutex::new(HashMap::new()),
            autonomy_running: Arc::new(AtomicBool::new(false)),
        }
    }

    // ---- user registry ----

    /// Register a connected user and wake the agents to the new presence.
    pub async fn user_connected(&self, user_id: &str, username: Option<&str>) {
        let username = username
            .map(str::to_string)
            .unwrap_or_else(|| format!("User_{}", &user_id[..user_id.len().min(8)]));

        self.active_users.lock().await.insert(
            user_id.to_string(),
            ChatUser {
                user_id: user_id.to_string(),
                username: username.clone(),
                connected_at: Utc::now(),
                last_active: Utc::now(),
            },
        );

        let users = self.user_ids().await;
        let peers = self.peer_states().await;
        let events = [PerceivedEvent::UserJoined {
            user_id: user_id.to_string(),
        }];
        for (_, agent) in self.roster.iter() {
            let mut agent = agent.lock().await;
            agent.autonomy.update_awareness(&users, &peers, &events);
        }

        self.bus.publish(WorldEvent::UserPresence {
            user_id: user_id.to_string(),
            action: "joined".to_string(),
            username: Some(username.clone()),
            timestamp: Utc::now(),
        });
        info!(user = %username, "user connected");
    }

    /// Remove a user from the registry.
    pub async fn user_disconnected(&self, user_id: &str) {
        let removed = self.active_users.lock().await.remove(user_id);
        if let Some(user) = removed {
            self.bus.publish(WorldEvent::UserPresence {
                user_id: user_id.to_string(),
                action: "left".to_string(),
                username: Some(user.username.clone()),
                timestamp: Utc::now(),
            });
            info!(user = %user.username, "user disconnected");
        }
    }

    /// Active users, for API listings.
    pub async fn active_users(&self) -> Vec<ChatUser> {
        self.active_users.lock().await.values().cloned().collect()
    }

    /// Active conversations, for API listings.
    pub async fn active_conversations(&self) -> Vec<(String, ConversationEntry)> {
        self.active_conversations
            .lock()
            .await
            .iter()
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect()
    }

    // ---- user <-> agent chat ----

    /// Route a user message to an agent and return the reply. LLM
    /// failures are logged and surface as `None`.
    pub async fn send_user_message(
        &self,
        user_id: &str,
        agent_name: &str,
        message: &str,
    ) -> Option<String> {
        let agent = self.roster.get(agent_name)?;

        if let Some(user) = self.active_users.lock().await.get_mut(user_id) {
            user.last_active = Utc::now();
        }

        let agent_id = { agent.lock().await.id.clone() };
        self.bus.publish(WorldEvent::ChatMessage {
            user_id: user_id.to_string(),
            agent_id,
            message: message.to_string(),
            timestamp: Utc::now(),
        });

        let (system, prompt) = {
            let mut agent = agent.lock().await;
            agent.memory.record_interaction(
                InteractionType::UserMessage,
                user_id,
                agent_name,
                message,
                0.7,
                None,
                None,
            );
            let context = agent.memory.context_for_entity(user_id);
            (
                prompts::system_prompt(agent.archetype),
                prompts::user_reply_prompt(&agent, message, &context),
            )
        };

        let response = match self.llm.generate(system, &prompt, 300).await {
            Ok(response) => response,
            Err(e) => {
                error!(agent = agent_name, "error generating agent response: {}", e);
                return None;
            }
        };

        let (agent_id, emotional_state) = {
            let mut agent = agent.lock().await;
            agent.update_emotional_state(message, &response);
            let state = agent.emotional_state;
            agent.memory.record_interaction(
                InteractionType::AgentResponse,
                agent_name,
                user_id,
                &response,
                0.6,
                Some(state),
                None,
            );
            // A conversation leaves the agent wanting more of it.
            agent.autonomy.add_desire(
                DesireType::Social,
                0.4,
                Some(user_id.to_string()),
                Some("Recent conversation".to_string()),
            );
            (agent.id.clone(), state)
        };

        self.bus.publish(WorldEvent::ChatResponse {
            agent_id,
            agent_name: agent_name.to_string(),
            user_id: user_id.to_string(),
            message: response.clone(),
            emotional_state: Some(emotional_state.to_string()),
            timestamp: Utc::now(),
        });

        info!(user = user_id, agent = agent_name, "chat turn completed");
        Some(response)
    }

    // ---- agent <-> agent conversations ----

    /// One agent opens a conversation with another: opening line and the
    /// immediate reply, both broadcast. Returns the conversation id.
    pub async fn initiate_agent_conversation(
        &self,
        initiator_name: &str,
        target_name: &str,
        topic: Option<&str>,
    ) -> Option<String> {
        let initiator = self.roster.get(initiator_name)?;
        let target = self.roster.get(target_name)?;

        let (system, prompt, conv_id) = {
            let mut agent = initiator.lock().await;
            let conv_id = agent.memory.start_conversation(
                vec![initiator_name.to_string(), target_name.to_string()],
                topic.map(str::to_string),
            );
            (
                prompts::system_prompt(agent.archetype),
                prompts::conversation_opener_prompt(&agent, target_name, topic),
                conv_id,
            )
        };

        let opening = match self.llm.generate(system, &prompt, 200).await {
            Ok(opening) => opening,
            Err(e) => {
                error!(
                    initiator = initiator_name,
                    "error starting agent conversation: {}", e
                );
                return None;
            }
        };

        {
            let mut agent = initiator.lock().await;
            let state = agent.emotional_state;
            agent.memory.record_interaction(
                InteractionType::AgentToAgent,
                initiator_name,
                target_name,
                &opening,
                0.5,
                Some(state),
                Some(conv_id.clone()),
            );
        }

        self.bus.publish(WorldEvent::AgentChat {
            from_agent: initiator_name.to_string(),
            to_agent: target_name.to_string(),
            message: opening.clone(),
            conversation_id: Some(conv_id.clone()),
            timestamp: Utc::now(),
        });

        let response = self
            .agent_reply(target_name, &target, initiator_name, &opening, &conv_id)
            .await?;

        self.active_conversations.lock().await.insert(
            conv_id.clone(),
            ConversationEntry {
                participants: [initiator_name.to_string(), target_name.to_string()],
                topic: topic.map(str::to_string),
                started_at: Utc::now(),
                message_count: 2,
            },
        );

        self.bus.publish(WorldEvent::AgentChat {
            from_agent: target_name.to_string(),
            to_agent: initiator_name.to_string(),
            message: response,
            conversation_id: Some(conv_id.clone()),
            timestamp: Utc::now(),
        });

        info!(
            initiator = initiator_name,
            target = target_name,
            topic = topic.unwrap_or("general"),
            "agent conversation started"
        );
        Some(conv_id)
    }

    /// Take a turn in an existing conversation: the non-speaker replies.
    pub async fn continue_agent_conversation(
        &self,
        conversation_id: &str,
        speaker_name: &str,
        message: &str,
    ) -> Option<String> {
        let listener_name = {
            let conversations = self.active_conversations.lock().await;
            let entry = conversations.get(conversation_id)?;
            if !entry.participants.contains(&speaker_name.to_string()) {
                return None;
            }
            entry
                .participants
                .iter()
                .find(|p| *p != speaker_name)?
                .clone()
        };

        let listener = self.roster.get(&listener_name)?;

        self.bus.publish(WorldEvent::AgentChat {
            from_agent: speaker_name.to_string(),
            to_agent: listener_name.clone(),
            message: message.to_string(),
            conversation_id: Some(conversation_id.to_string()),
            timestamp: Utc::now(),
        });

        let response = self
            .agent_reply(
                &listener_name,
                &listener,
                speaker_name,
                message,
                conversation_id,
            )
            .await?;

        if let Some(entry) = self
            .active_conversations
            .lock()
            .await
            .get_mut(conversation_id)
        {
            entry.message_count += 1;
        }

        self.bus.publish(WorldEvent::AgentChat {
            from_agent: listener_name,
            to_agent: speaker_name.to_string(),
            message: response.clone(),
            conversation_id: Some(conversation_id.to_string()),
            timestamp: Utc::now(),
        });

        Some(response)
    }

    /// Generate and record one agent's reply to another.
    async fn agent_reply(
        &self,
        listener_name: &str,
        listener: &crate::agents::SharedAgent,
        from_name: &str,
        message: &str,
        conv_id: &str,
    ) -> Option<String> {
        let (system, prompt) = {
            let mut agent = listener.lock().await;
            agent.memory.record_interaction(
                InteractionType::AgentToAgent,
                from_name,
                listener_name,
                message,
                0.6,
                None,
                Some(conv_id.to_string()),
            );
            let context = agent.memory.context_for_entity(from_name);
            (
                prompts::system_prompt(agent.archetype),
                prompts::agent_reply_prompt(&agent, from_name, message, &context),
            )
        };

        let response = match self.llm.generate(system, &prompt, 200).await {
            Ok(response) => response,
            Err(e) => {
                error!(agent = listener_name, "error continuing conversation: {}", e);
                return None;
            }
        };

        {
            let mut agent = listener.lock().await;
            let state = agent.emotional_state;
            agent.memory.record_interaction(
                InteractionType::AgentToAgent,
                listener_name,
                from_name,
                &response,
                0.5,
                Some(state),
                Some(conv_id.to_string()),
            );
        }

        Some(response)
    }

    // ---- autonomy loop ----

    /// Flag that keeps the autonomy loop alive.
    pub fn autonomy_flag(&self) -> Arc<AtomicBool> {
        self.autonomy_running.clone()
    }

    /// Poll every agent for autonomous actions at a fixed interval.
    ///
    /// Besides the small per-tick decay inside awareness updates, a
    /// coarse half-hour decay sweep runs once per simulated half hour so
    /// long-lived desires fade at wall-clock rate.
    pub async fn run_autonomy_loop(&self, interval: Duration) {
        self.autonomy_running.store(true, Ordering::SeqCst);
        info!("agent autonomy loop started");

        let ticks_per_coarse_decay = (1800 / interval.as_secs().max(1)).max(1);
        let mut ticks: u64 = 0;

        while self.autonomy_running.load(Ordering::SeqCst) {
            self.autonomy_tick().await;

            ticks += 1;
            if ticks % ticks_per_coarse_decay == 0 {
                for (_, agent) in self.roster.iter() {
                    agent.lock().await.autonomy.decay_desires(0.5);
                }
            }

            tokio::time::sleep(interval).await;
        }

        info!("agent autonomy loop stopped");
    }

    /// One polling pass: refresh awareness, then let each agent act at
    /// most once.
    pub async fn autonomy_tick(&self) {
        let users = self.user_ids().await;
        let peers = self.peer_states().await;

        let mut decided = Vec::new();
        for (name, agent) in self.roster.iter() {
            let mut agent = agent.lock().await;
            agent.autonomy.update_awareness(&users, &peers, &[]);
            if let Some(action) = agent.autonomy.decide_action() {
                decided.push((name.clone(), agent.id.clone(), action));
            }
        }

        for (name, id, action) in decided {
            self.execute_action(&name, &id, action).await;
        }
    }

    /// Carry out one autonomous action through the bus and, for chat
    /// actions, the conversation machinery.
    pub async fn execute_action(&self, agent_name: &str, agent_id: &str, action: AutonomousAction) {
        info!(agent = agent_name, action = %action.action_type, "executing autonomous action");

        match action.action_type {
            ActionType::InitiateChat => {
                if let Some(target) = &action.target {
                    if self.roster.get(target).is_some() {
                        self.initiate_agent_conversation(agent_name, target, None)
                            .await;
                    } else if let Some(user) =
                        self.active_users.lock().await.get(target).cloned()
                    {
                        let thought =
                            format!("*{} turns to address {}*", agent_name, user.username);
                        self.bus.publish(WorldEvent::AgentThought {
                            agent_id: agent_id.to_string(),
                            agent_name: agent_name.to_string(),
                            thought,
                            timestamp: Utc::now(),
                        });
                    }
                }
            }
            ActionType::ShareThought
            | ActionType::MakeObservation
            | ActionType::ExpressEmotion => {
                if let Some(content) = &action.content {
                    self.bus.publish(WorldEvent::AgentThought {
                        agent_id: agent_id.to_string(),
                        agent_name: agent_name.to_string(),
                        thought: content.clone(),
                        timestamp: Utc::now(),
                    });
                }
            }
            _ => {}
        }

        self.bus.publish(WorldEvent::AgentAction {
            agent_id: agent_id.to_string(),
            agent_name: agent_name.to_string(),
            action_type: action.action_type.to_string(),
            target: action.target.clone(),
            content: action.content.clone(),
            timestamp: Utc::now(),
        });
    }

    // ---- helpers ----

    async fn user_ids(&self) -> Vec<String> {
        self.active_users.lock().await.keys().cloned().collect()
    }

    async fn peer_states(&self) -> HashMap<String, PeerState> {
        let mut peers = HashMap::new();
        for (name, agent) in self.roster.iter() {
            let agent = agent.lock().await;
            peers.insert(
                name.clone(),
                PeerState {
                    name: name.clone(),
                    is_speaking: agent.current_animation != "idle",
                },
            );
        }
        peers
    }
}
