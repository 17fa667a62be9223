//! Debate cycle orchestrator.
//!
//! Drives the fixed-phase loop forever: a rotating proposer brings a
//! proposal, the others challenge it, everyone votes, the tally decides
//! its fate, and accepted doctrines manifest as world structures. One
//! coroutine runs one cycle at a time; a failed cycle is abandoned and
//! the next one starts fresh.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use uuid::Uuid;

use crate::agents::{policy, prompts, AgentRoster};
use crate::config::Settings;
use crate::events::{SharedEventBus, WorldEvent};
use crate::llm::{LlmError, TextGenerator};
use crate::world::WorldState;

use super::types::{
    AgentStanding, Challenge, DebateContext, DebateOutcomeKind, Doctrine, Proposal, ProposalType,
    Vote, VoteTally,
};

/// Phase of the debate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebatePhase {
    Idle,
    Proposal,
    Challenge,
    Voting,
    Result,
    WorldUpdate,
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Proposal => write!(f, "proposal"),
            Self::Challenge => write!(f, "challenge"),
            Self::Voting => write!(f, "voting"),
            Self::Result => write!(f, "result"),
            Self::WorldUpdate => write!(f, "world_update"),
        }
    }
}

/// Error that aborts the current cycle.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("proposal generation failed for {agent}: {source}")]
    ProposalGeneration { agent: String, source: LlmError },

    #[error("challenge generation failed for {agent}: {source}")]
    ChallengeGeneration { agent: String, source: LlmError },

    #[error("no agents registered")]
    NoAgents,
}

/// Phase pacing. Tests zero these out; ordering is unaffected.
#[derive(Debug, Clone)]
pub struct DebateTimings {
    pub proposal: Duration,
    pub challenge: Duration,
    pub voting: Duration,
    pub result: Duration,
    pub cycle_pause: Duration,
    pub backoff: Duration,
}

impl DebateTimings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            proposal: Duration::from_secs(settings.proposal_phase_secs),
            challenge: Duration::from_secs(settings.challenge_phase_secs),
            voting: Duration::from_secs(settings.voting_phase_secs),
            result: Duration::from_secs(settings.result_phase_secs),
            cycle_pause: Duration::from_secs(settings.cycle_pause_secs),
            backoff: Duration::from_secs(settings.cycle_backoff_secs),
        }
    }

    /// All-zero pacing for headless/test runs.
    pub fn zero() -> Self {
        Self {
            proposal: Duration::ZERO,
            challenge: Duration::ZERO,
            voting: Duration::ZERO,
            result: Duration::ZERO,
            cycle_pause: Duration::ZERO,
            backoff: Duration::ZERO,
        }
    }
}

/// Summary of one completed cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle_number: u64,
    pub proposer: String,
    pub proposal_type: ProposalType,
    pub outcome: DebateOutcomeKind,
    pub tally: VoteTally,
    pub challenge_count: usize,
}

/// The debate cycle orchestrator. Sole writer of proposal, challenge,
/// vote, doctrine, and structure state.
pub struct DebateOrchestrator {
    roster: AgentRoster,
    bus: SharedEventBus,
    llm: Arc<dyn TextGenerator>,
    timings: DebateTimings,

    world: WorldState,
    doctrines: Vec<Doctrine>,

    cycle_number: u64,
    current_phase: DebatePhase,
    running: Arc<AtomicBool>,

    rng: StdRng,
}

impl DebateOrchestrator {
    pub fn new(
        roster: AgentRoster,
        bus: SharedEventBus,
        llm: Arc<dyn TextGenerator>,
        timings: DebateTimings,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            roster,
            bus,
            llm,
            timings,
            world: WorldState::new(),
            doctrines: Vec::new(),
            cycle_number: 0,
            current_phase: DebatePhase::Idle,
            running: Arc::new(AtomicBool::new(false)),
            rng,
        }
    }

    /// Flag that keeps the supervisor loop alive. Clear it to stop after
    /// the in-flight cycle.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn cycle_number(&self) -> u64 {
        self.cycle_number
    }

    pub fn current_phase(&self) -> DebatePhase {
        self.current_phase
    }

    pub fn doctrines(&self) -> &[Doctrine] {
        &self.doctrines
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Supervisor loop: run cycles until stopped. A failed cycle is
    /// logged and abandoned; the counter is not rolled back.
    pub async fn run(&mut self) {
        self.running.store(true, Ordering::SeqCst);
        info!("debate orchestrator starting");

        while self.running.load(Ordering::SeqCst) {
            if let Err(e) = self.run_cycle().await {
                error!(cycle = self.cycle_number, "debate cycle failed: {}", e);
                tokio::time::sleep(self.timings.backoff).await;
            }
        }

        info!("debate orchestrator stopped");
    }

    /// Run one complete debate cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        if self.roster.is_empty() {
            return Err(CycleError::NoAgents);
        }

        self.cycle_number += 1;
        info!(cycle = self.cycle_number, "starting debate cycle");

        self.bus.publish(WorldEvent::CycleStart {
            cycle_number: self.cycle_number,
            timestamp: Utc::now(),
        });

        let ctx = self.current_state().await;

        let proposal = self.proposal_phase(&ctx).await?;
        let challenges = self.challenge_phase(&proposal).await?;
        let votes = self.voting_phase(&proposal, &challenges).await;
        let (outcome, tally) = self.result_phase(&proposal, &votes).await;

        if outcome == DebateOutcomeKind::Accepted {
            self.world_update_phase(&proposal).await;
        }

        self.bus.publish(WorldEvent::CycleEnd {
            cycle_number: self.cycle_number,
            proposal_type: Some(proposal.proposal_type.to_string()),
            proposer: Some(proposal.author.clone()),
            doctrines_count: self.doctrines.len(),
            structures_count: self.world.structure_count(),
            timestamp: Utc::now(),
        });

        tokio::time::sleep(self.timings.cycle_pause).await;

        Ok(CycleReport {
            cycle_number: self.cycle_number,
            proposer: proposal.author.clone(),
            proposal_type: proposal.proposal_type,
            outcome,
            tally,
            challenge_count: challenges.len(),
        })
    }

    async fn proposal_phase(&mut self, ctx: &DebateContext) -> Result<Proposal, CycleError> {
        self.current_phase = DebatePhase::Proposal;
        self.broadcast_phase(DebatePhase::Proposal, self.timings.proposal);

        let index = (self.cycle_number % self.roster.len() as u64) as usize;
        let (proposer_name, proposer) = self.roster.at(index);
        info!(proposer = %proposer_name, "proposal phase");

        // Stage the proposer, then build the prompt from its state.
        let (system, prompt, proposal_type, archetype) = {
            let mut agent = proposer.lock().await;
            agent.move_to(0.0, 0.0, -5.0);
            agent.set_animation("proposing");
            self.bus.publish(WorldEvent::AgentUpdate {
                agent: agent.snapshot(),
                timestamp: Utc::now(),
            });

            let proposal_type = policy::select_proposal_type(&agent, &mut self.rng);
            let prompt = prompts::proposal_prompt(&agent, proposal_type, ctx, &mut self.rng);
            (
                prompts::system_prompt(agent.archetype),
                prompt,
                proposal_type,
                agent.archetype.to_string(),
            )
        };

        // The lock is released during generation; a stall here stalls
        // the whole cycle (no phase-level timeout by contract).
        let content = self
            .llm
            .generate(system, &prompt, 500)
            .await
            .map_err(|source| CycleError::ProposalGeneration {
                agent: proposer_name.clone(),
                source,
            })?;

        let proposal = Proposal::new(
            self.cycle_number,
            &proposer_name,
            proposal_type,
            content,
            &archetype,
        );

        {
            let mut agent = proposer.lock().await;
            agent.proposals_made += 1;
        }

        let proposer_id = { proposer.lock().await.id.clone() };
        self.bus.publish(WorldEvent::Proposal {
            proposal_id: proposal.id.clone(),
            proposal_type: proposal.proposal_type.to_string(),
            content: proposal.content.clone(),
            proposer: proposer_name,
            proposer_id,
            timestamp: Utc::now(),
        });

        tokio::time::sleep(self.timings.proposal).await;
        Ok(proposal)
    }

    async fn challenge_phase(&mut self, proposal: &Proposal) -> Result<Vec<Challenge>, CycleError> {
        self.current_phase = DebatePhase::Challenge;
        self.broadcast_phase(DebatePhase::Challenge, self.timings.challenge);

        let challengers: Vec<_> = self
            .roster
            .iter()
            .filter(|(name, _)| name != &proposal.author)
            .cloned()
            .collect();
        let pacing = self.timings.challenge / challengers.len().max(1) as u32;

        let mut challenges = Vec::new();
        for (name, agent) in challengers {
            let (system, prompt, tag, agent_id) = {
                let agent = agent.lock().await;
                (
                    prompts::system_prompt(agent.archetype),
                    prompts::challenge_prompt(&agent, proposal),
                    policy::challenge_type(&agent, proposal, &mut self.rng),
                    agent.id.clone(),
                )
            };

            let content = self
                .llm
                .generate(system, &prompt, 200)
                .await
                .map_err(|source| CycleError::ChallengeGeneration {
                    agent: name.clone(),
                    source,
                })?;

            {
                let mut agent = agent.lock().await;
                let station = agent.archetype.challenge_position();
                agent.move_to(station[0], station[1], station[2]);
                agent.set_animation("challenging");
                self.bus.publish(WorldEvent::AgentUpdate {
                    agent: agent.snapshot(),
                    timestamp: Utc::now(),
                });
            }

            let challenge = Challenge {
                agent_id,
                agent_name: name.clone(),
                content,
                challenge_type: tag,
                timestamp: Utc::now(),
            };

            self.bus.publish(WorldEvent::Challenge {
                agent_id: challenge.agent_id.clone(),
                agent_name: challenge.agent_name.clone(),
                content: challenge.content.clone(),
                challenge_type: challenge.challenge_type.clone(),
                timestamp: Utc::now(),
            });

            challenges.push(challenge);
            tokio::time::sleep(pacing).await;
        }

        Ok(challenges)
    }

    async fn voting_phase(&mut self, proposal: &Proposal, challenges: &[Challenge]) -> Vec<Vote> {
        self.current_phase = DebatePhase::Voting;
        self.broadcast_phase(DebatePhase::Voting, self.timings.voting);

        let pacing = self.timings.voting / self.roster.len().max(1) as u32;
        let mut votes = Vec::new();

        for (name, agent) in self.roster.clone().iter() {
            let vote = {
                let mut agent = agent.lock().await;
                let (vote_type, reasoning, confidence) =
                    policy::evaluate_proposal(&agent, proposal, challenges, &mut self.rng);
                agent.set_animation("voting");
                self.bus.publish(WorldEvent::AgentUpdate {
                    agent: agent.snapshot(),
                    timestamp: Utc::now(),
                });
                Vote {
                    agent_id: agent.id.clone(),
                    agent_name: name.clone(),
                    vote: vote_type,
                    reasoning,
                    confidence,
                    timestamp: Utc::now(),
                }
            };

            self.bus.publish(WorldEvent::Vote {
                agent_id: vote.agent_id.clone(),
                agent_name: vote.agent_name.clone(),
                vote: vote.vote,
                reasoning: vote.reasoning.clone(),
                confidence: vote.confidence,
                timestamp: Utc::now(),
            });

            votes.push(vote);
            tokio::time::sleep(pacing).await;
        }

        votes
    }

    async fn result_phase(
        &mut self,
        proposal: &Proposal,
        votes: &[Vote],
    ) -> (DebateOutcomeKind, VoteTally) {
        self.current_phase = DebatePhase::Result;
        self.broadcast_phase(DebatePhase::Result, self.timings.result);

        let tally = VoteTally::count(votes);
        let outcome = tally.outcome();
        info!(cycle = self.cycle_number, outcome = %outcome, "votes tallied");

        if let Some(proposer) = self.roster.get(&proposal.author) {
            let mut agent = proposer.lock().await;
            agent.record_proposal_outcome(
                self.cycle_number,
                &proposal.proposal_type.to_string(),
                &proposal.content,
                outcome == DebateOutcomeKind::Accepted,
            );
        }

        // Every ordered pair of distinct agents compares vote types.
        for a in votes {
            for b in votes {
                if a.agent_name == b.agent_name {
                    continue;
                }
                if let Some(agent) = self.roster.get(&a.agent_name) {
                    let mut agent = agent.lock().await;
                    agent.update_relationship(&b.agent_name, a.vote == b.vote);
                }
            }
        }

        self.bus.publish(WorldEvent::DebateResult {
            outcome,
            accept: tally.accept,
            reject: tally.reject,
            mutate: tally.mutate,
            delay: tally.delay,
            proposal_id: proposal.id.clone(),
            proposer: proposal.author.clone(),
            timestamp: Utc::now(),
        });

        if outcome == DebateOutcomeKind::Accepted {
            self.doctrines.push(Doctrine {
                id: Uuid::new_v4().to_string(),
                content: proposal.content.clone(),
                proposal_type: proposal.proposal_type,
                proposed_by: proposal.author.clone(),
                accepted_at_cycle: self.cycle_number,
            });
        }

        tokio::time::sleep(self.timings.result).await;
        (outcome, tally)
    }

    async fn world_update_phase(&mut self, proposal: &Proposal) {
        self.current_phase = DebatePhase::WorldUpdate;

        let doctrine_id = self
            .doctrines
            .last()
            .map(|d| d.id.clone())
            .unwrap_or_default();

        let (color, material) = match self.roster.get(&proposal.author) {
            Some(agent) => {
                let agent = agent.lock().await;
                (
                    agent.primary_color.clone(),
                    agent.archetype.material_preset().to_string(),
                )
            }
            None => ("#FFFFFF".to_string(), "stone".to_string()),
        };

        let structure = self.world.spawn_structure(
            proposal.proposal_type,
            &doctrine_id,
            &proposal.author,
            &color,
            &material,
            self.cycle_number,
            &mut self.rng,
        );

        self.bus.publish(WorldEvent::StructureSpawn {
            structure,
            timestamp: Utc::now(),
        });

        // Everyone returns to their home station.
        for (_, agent) in self.roster.clone().iter() {
            let mut agent = agent.lock().await;
            agent.return_home();
            self.bus.publish(WorldEvent::AgentUpdate {
                agent: agent.snapshot(),
                timestamp: Utc::now(),
            });
        }
    }

    fn broadcast_phase(&self, phase: DebatePhase, duration: Duration) {
        self.bus.publish(WorldEvent::DebatePhase {
            phase: phase.to_string(),
            duration_secs: duration.as_secs(),
            timestamp: Utc::now(),
        });
    }

    /// Snapshot of debate state for prompt construction.
    async fn current_state(&self) -> DebateContext {
        let doctrines = self
            .doctrines
            .iter()
            .rev()
            .take(20)
            .rev()
            .map(|d| d.content.clone())
            .collect();

        let mut agents = Vec::new();
        for (name, agent) in self.roster.iter() {
            let agent = agent.lock().await;
            agents.push(AgentStanding {
                name: name.clone(),
                influence: agent.influence_score,
                proposals_accepted: agent.proposals_accepted,
            });
        }

        DebateContext {
            cycle_number: self.cycle_number,
            doctrines,
            structures: self.world.structure_count(),
            agents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::llm::CannedGenerator;
    use crate::world::structure_type_for;

    // Keyword-rich content every archetype reads favorably: Axioma sees
    // order words, Veridicus sees logic words, Paradoxia sees creative
    // words. Axioma and Veridicus accept deterministically, which alone
    // reaches the accept threshold.
    const AGREEABLE: &str = "Because the evidence is consistent and proof dances \
        with new order, sacred truth and synthesis transform ritual law";

    fn orchestrator(content: &str, seed: u64) -> DebateOrchestrator {
        let roster = AgentRoster::standard(Some(seed));
        let bus = EventBus::new().shared();
        let llm = Arc::new(CannedGenerator::fixed(content));
        DebateOrchestrator::new(roster, bus, llm, DebateTimings::zero(), Some(seed))
    }

    #[tokio::test]
    async fn test_accepted_cycle_end_to_end() {
        let mut orch = orchestrator(AGREEABLE, 11);
        let report = orch.run_cycle().await.unwrap();

        assert_eq!(report.cycle_number, 1);
        // cycle_number % 3 == 1 -> second agent in rotation order.
        assert_eq!(report.proposer, "Veridicus");
        assert_eq!(report.challenge_count, 2);
        assert!(report.tally.accept >= 2);
        assert_eq!(report.outcome, DebateOutcomeKind::Accepted);

        // One doctrine recorded at this cycle, one structure spawned at
        // spiral index 0 with the type mapped from the proposal.
        assert_eq!(orch.doctrines().len(), 1);
        assert_eq!(orch.doctrines()[0].accepted_at_cycle, 1);
        assert_eq!(orch.world().structure_count(), 1);
        let structure = &orch.world().structures()[0];
        assert_eq!(
            structure.structure_type,
            structure_type_for(report.proposal_type)
        );
        assert_eq!(structure.created_by, "Veridicus");
        assert_eq!(structure.material_preset, "stone");
    }

    #[tokio::test]
    async fn test_round_robin_proposers() {
        let mut orch = orchestrator(AGREEABLE, 12);
        let mut proposers = Vec::new();
        for _ in 0..6 {
            let report = orch.run_cycle().await.unwrap();
            proposers.push(report.proposer);
        }
        assert_eq!(
            proposers,
            vec![
                "Veridicus",
                "Paradoxia",
                "Axioma",
                "Veridicus",
                "Paradoxia",
                "Axioma"
            ]
        );
    }

    #[tokio::test]
    async fn test_generation_failure_aborts_cycle_but_counter_advances() {
        let roster = AgentRoster::standard(Some(13));
        let bus = EventBus::new().shared();
        let llm = Arc::new(CannedGenerator::failing());
        let mut orch =
            DebateOrchestrator::new(roster, bus, llm, DebateTimings::zero(), Some(13));

        let err = orch.run_cycle().await.unwrap_err();
        assert!(matches!(err, CycleError::ProposalGeneration { .. }));
        assert_eq!(orch.cycle_number(), 1);
        assert!(orch.doctrines().is_empty());

        // The next attempt starts a fresh cycle with the number advanced.
        let err = orch.run_cycle().await.unwrap_err();
        assert!(matches!(err, CycleError::ProposalGeneration { .. }));
        assert_eq!(orch.cycle_number(), 2);
    }

    #[tokio::test]
    async fn test_relationships_updated_after_result() {
        let mut orch = orchestrator(AGREEABLE, 14);
        orch.run_cycle().await.unwrap();

        // Axioma and Veridicus both voted accept, so each has at least
        // one relationship entry with nonzero interactions.
        let axioma = orch.roster.get("Axioma").unwrap();
        let axioma = axioma.lock().await;
        let rel = axioma
            .relationships
            .get("Veridicus")
            .expect("relationship recorded");
        assert_eq!(rel.total_interactions, 1);
        assert_eq!(rel.alliances + rel.conflicts, 1);
        // Both accepted: that pair must be an alliance.
        assert_eq!(rel.alliances, 1);
        assert!((rel.trust_score - 0.1).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_proposer_bookkeeping() {
        let mut orch = orchestrator(AGREEABLE, 15);
        orch.run_cycle().await.unwrap();

        let proposer = orch.roster.get("Veridicus").unwrap();
        let proposer = proposer.lock().await;
        assert_eq!(proposer.proposals_made, 1);
        assert_eq!(proposer.proposals_accepted, 1);
        assert_eq!(proposer.influence_score, 110);
        assert_eq!(proposer.debate_history.len(), 1);
    }

    #[tokio::test]
    async fn test_cycle_events_published_in_order() {
        let roster = AgentRoster::standard(Some(16));
        let bus = EventBus::new().shared();
        let mut rx = bus.subscribe();
        let llm = Arc::new(CannedGenerator::fixed(AGREEABLE));
        let mut orch = DebateOrchestrator::new(
            roster,
            bus.clone(),
            llm,
            DebateTimings::zero(),
            Some(16),
        );
        orch.run_cycle().await.unwrap();

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(event.event_type());
        }

        let position = |tag: &str| kinds.iter().position(|k| *k == tag).unwrap();
        assert!(position("cycle_start") < position("proposal"));
        assert!(position("proposal") < position("challenge"));
        assert!(position("challenge") < position("vote"));
        assert!(position("vote") < position("debate_result"));
        assert!(position("debate_result") < position("structure_spawn"));
        assert!(position("structure_spawn") < position("cycle_end"));
        assert_eq!(kinds.iter().filter(|k| **k == "challenge").count(), 2);
        assert_eq!(kinds.iter().filter(|k| **k == "vote").count(), 3);
    }

    #[tokio::test]
    async fn test_agents_return_home_after_accept() {
        let mut orch = orchestrator(AGREEABLE, 17);
        orch.run_cycle().await.unwrap();

        for (_, agent) in orch.roster.clone().iter() {
            let agent = agent.lock().await;
            assert_eq!(agent.position, agent.archetype.home_position());
            assert_eq!(agent.current_animation, "idle");
        }
    }

    #[tokio::test]
    async fn test_rejecting_content_produces_no_structure() {
        // Chaos-heavy content: Axioma rejects outright; Veridicus sees
        // absolutes ("always", "never", "all" via "always") and rejects.
        let content = "Chaos always wins, order never holds, all is random \
            paradox and contradiction and doubt, it must be and cannot be";
        let mut orch = orchestrator(content, 18);
        let report = orch.run_cycle().await.unwrap();

        assert!(report.tally.reject >= 2);
        assert_eq!(report.outcome, DebateOutcomeKind::Rejected);
        assert_eq!(orch.doctrines().len(), 0);
        assert_eq!(orch.world().structure_count(), 0);

        // Proposer lost influence.
        let proposer = orch.roster.get(&report.proposer).unwrap();
        let proposer = proposer.lock().await;
        assert_eq!(proposer.proposals_accepted, 0);
        assert!(proposer.influence_score < 100 + 10);
    }
}
