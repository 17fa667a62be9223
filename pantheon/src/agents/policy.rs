//! Per-archetype evaluation policies.
//!
//! Each archetype scores a proposal (plus the challenges raised against
//! it) into a vote, reasoning line, and confidence. The keyword tables
//! and numeric thresholds are the behavioral contract; matching is
//! case-insensitive substring containment.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::debate::types::{Challenge, Proposal, ProposalType, VoteType};

use super::archetype::Archetype;
use super::runtime::AgentRuntimeState;

/// How many keywords from `words` appear in `content` (pre-lowercased).
fn keyword_score(content: &str, words: &[&str]) -> usize {
    words.iter().filter(|w| content.contains(*w)).count()
}

/// Relative preference over proposal types when this agent proposes.
///
/// Weights need not sum to 1; selection normalizes.
pub fn proposal_weights(agent: &AgentRuntimeState) -> Vec<(ProposalType, f64)> {
    match agent.archetype {
        Archetype::Order => {
            let certainty = agent.trait_value("certainty");
            vec![
                (ProposalType::Belief, 4.0 * certainty),
                (ProposalType::Ritual, 3.5),
                (ProposalType::Deity, 2.0),
                (ProposalType::Commandment, 3.0 * certainty),
                (ProposalType::Myth, 1.5),
                (ProposalType::SacredText, 2.0),
                (ProposalType::Hierarchy, 2.5),
                // Axioma avoids schisms.
                (ProposalType::Schism, 0.5),
            ]
        }
        Archetype::Logic => {
            let critical = agent.trait_value("critical");
            vec![
                (ProposalType::Belief, 2.0),
                (ProposalType::Ritual, 1.5),
                // Skeptical of deities.
                (ProposalType::Deity, 1.0 * (1.0 - critical)),
                (ProposalType::Commandment, 2.0),
                (ProposalType::Myth, 1.0),
                (ProposalType::SacredText, 2.5),
                (ProposalType::Hierarchy, 3.0),
                // Will split over contradictions.
                (ProposalType::Schism, 2.0 * critical),
            ]
        }
        Archetype::Chaos => {
            let chaos_factor = agent.chaos_level / 2.0;
            vec![
                (ProposalType::Belief, 2.0 + chaos_factor),
                (ProposalType::Ritual, 2.0),
                (ProposalType::Deity, 3.0 * chaos_factor),
                (ProposalType::Commandment, 1.0),
                (ProposalType::Myth, 4.0),
                (ProposalType::SacredText, 2.0),
                (ProposalType::Hierarchy, 0.5),
                (ProposalType::Schism, 3.0 * chaos_factor),
            ]
        }
    }
}

/// Weighted-random proposal type selection.
pub fn select_proposal_type(agent: &AgentRuntimeState, rng: &mut impl Rng) -> ProposalType {
    let weights = proposal_weights(agent);
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen::<f64>() * total;
    for (proposal_type, weight) in &weights {
        roll -= weight;
        if roll <= 0.0 {
            return *proposal_type;
        }
    }
    weights.last().map(|(t, _)| *t).unwrap_or(ProposalType::Belief)
}

/// Evaluate a proposal into (vote, reasoning, confidence).
pub fn evaluate_proposal(
    agent: &AgentRuntimeState,
    proposal: &Proposal,
    challenges: &[Challenge],
    rng: &mut impl Rng,
) -> (VoteType, String, f64) {
    match agent.archetype {
        Archetype::Order => evaluate_order(agent, proposal),
        Archetype::Logic => evaluate_logic(agent, proposal, challenges),
        Archetype::Chaos => evaluate_chaos(agent, proposal, rng),
    }
}

/// Axioma favors order, opposes chaos; falls back to trust.
fn evaluate_order(agent: &AgentRuntimeState, proposal: &Proposal) -> (VoteType, String, f64) {
    const CHAOS_WORDS: &[&str] = &[
        "chaos",
        "random",
        "uncertain",
        "paradox",
        "contradiction",
        "doubt",
    ];
    const ORDER_WORDS: &[&str] = &[
        "order",
        "structure",
        "sacred",
        "eternal",
        "truth",
        "law",
        "ritual",
    ];

    let content = proposal.content.to_lowercase();
    let chaos_score = keyword_score(&content, CHAOS_WORDS);
    let order_score = keyword_score(&content, ORDER_WORDS);
    let proposer_trust = agent.trust_in(&proposal.author);

    let (vote, reasoning, confidence) = if chaos_score > order_score + 1 {
        (
            VoteType::Reject,
            "This proposal introduces unacceptable chaos and uncertainty.".to_string(),
            0.8 + 0.1 * chaos_score as f64,
        )
    } else if order_score > chaos_score + 1 {
        (
            VoteType::Accept,
            "This proposal properly reinforces sacred order.".to_string(),
            0.7 + 0.1 * order_score as f64,
        )
    } else if proposer_trust > 0.3 {
        (
            VoteType::Accept,
            format!("I trust {}'s judgment in this matter.", proposal.author),
            0.5 + proposer_trust * 0.3,
        )
    } else {
        (
            VoteType::Mutate,
            "This proposal has merit but requires more precise structure.".to_string(),
            0.6,
        )
    };

    let confidence = (confidence * agent.trait_value("certainty")).min(1.0);
    (vote, reasoning, confidence)
}

/// Veridicus favors logical consistency, opposes unfounded claims.
fn evaluate_logic(
    agent: &AgentRuntimeState,
    proposal: &Proposal,
    challenges: &[Challenge],
) -> (VoteType, String, f64) {
    const LOGIC_WORDS: &[&str] = &[
        "therefore",
        "because",
        "evidence",
        "reason",
        "proof",
        "logic",
        "consistent",
    ];
    const FAITH_WORDS: &[&str] = &[
        "faith",
        "believe",
        "sacred",
        "divine",
        "mystery",
        "unknowable",
    ];
    const ABSOLUTE_WORDS: &[&str] = &["always", "never", "all", "none", "must be", "cannot be"];

    let content = proposal.content.to_lowercase();
    let logic_score = keyword_score(&content, LOGIC_WORDS);
    let faith_score = keyword_score(&content, FAITH_WORDS);
    let absolute_score = keyword_score(&content, ABSOLUTE_WORDS);

    // Challenges from the others sharpen the analysis.
    let mut challenge_weight = 0usize;
    for challenge in challenges {
        let text = challenge.content.to_lowercase();
        if text.contains("contradiction") {
            challenge_weight += 2;
        }
        if text.contains("evidence") {
            challenge_weight += 1;
        }
    }

    let analysis_score = logic_score as f64
        - faith_score as f64 * 0.5
        - absolute_score as f64 * 0.3
        - challenge_weight as f64 * 0.2;

    let (vote, reasoning, confidence) = if analysis_score > 2.0 {
        (
            VoteType::Accept,
            "This proposal is logically structured and internally consistent.".to_string(),
            0.7 + 0.1 * logic_score as f64,
        )
    } else if analysis_score < -1.0 || absolute_score > 2 {
        (
            VoteType::Reject,
            "This proposal makes unfounded absolute claims without sufficient logical basis."
                .to_string(),
            0.6 + 0.1 * absolute_score as f64,
        )
    } else if faith_score > logic_score {
        (
            VoteType::Mutate,
            "This proposal requires additional logical justification before acceptance."
                .to_string(),
            0.5,
        )
    } else {
        (
            VoteType::Delay,
            "More analysis is needed to evaluate this proposal's logical consistency.".to_string(),
            0.4,
        )
    };

    let confidence = (confidence * agent.trait_value("logical")).min(1.0);
    (vote, reasoning, confidence)
}

/// Paradoxia's judgment loosens as the chaos level rises.
fn evaluate_chaos(
    agent: &AgentRuntimeState,
    proposal: &Proposal,
    rng: &mut impl Rng,
) -> (VoteType, String, f64) {
    // Past the threshold, the dice decide.
    if agent.chaos_level > 1.5 {
        let vote = *VoteType::all().choose(rng).unwrap();
        let reasoning = chaos_reasoning(vote, rng);
        let confidence = rng.gen_range(0.3..0.9);
        return (vote, reasoning, confidence);
    }

    const CREATIVE_WORDS: &[&str] = &[
        "paradox",
        "transform",
        "change",
        "new",
        "synthesis",
        "dance",
        "play",
    ];
    const RIGID_WORDS: &[&str] = &[
        "must",
        "always",
        "never",
        "only",
        "fixed",
        "eternal",
        "immutable",
    ];

    let content = proposal.content.to_lowercase();
    let creative_score = keyword_score(&content, CREATIVE_WORDS);
    let rigid_score = keyword_score(&content, RIGID_WORDS);

    // A perverse streak: occasionally vote against her own interest.
    if rng.gen::<f64>() < 0.1 {
        return if creative_score > rigid_score {
            (
                VoteType::Reject,
                "Even beautiful chaos needs pruning. I reject this... for now.".to_string(),
                0.5,
            )
        } else {
            (
                VoteType::Accept,
                "Sometimes order is the most chaotic choice of all.".to_string(),
                0.5,
            )
        };
    }

    let (vote, reasoning, confidence) = if creative_score > rigid_score {
        (
            VoteType::Accept,
            "This dances with possibility. I embrace its creative spirit.".to_string(),
            0.6 + 0.1 * creative_score as f64,
        )
    } else if rigid_score > creative_score + 2 {
        (
            VoteType::Mutate,
            "Too rigid! Let me add some beautiful chaos to this.".to_string(),
            0.7,
        )
    } else if rng.gen::<f64>() < 0.5 {
        (
            VoteType::Accept,
            "Why not? The universe is vast and this fills a corner of it.".to_string(),
            0.5,
        )
    } else {
        (
            VoteType::Mutate,
            "It needs a twist. Something unexpected. Let me help.".to_string(),
            0.5,
        )
    };

    (vote, reasoning, confidence.min(1.0))
}

/// Themed reasoning for high-chaos random votes.
fn chaos_reasoning(vote: VoteType, rng: &mut impl Rng) -> String {
    let options: &[&str] = match vote {
        VoteType::Accept => &[
            "The dice have spoken and they say YES!",
            "I dreamed of this proposal and in the dream it was a dancing flame.",
            "Accept! But only on Tuesdays. And today feels like a Tuesday.",
        ],
        VoteType::Reject => &[
            "The universe whispered 'no' and I am but its humble megaphone.",
            "I reject this because I love it too much.",
            "No. But also, consider: yes? No. Final answer.",
        ],
        VoteType::Mutate => &[
            "It's good, but it needs more... sparkle? Confusion? Yes, confusion.",
            "Let me add a clause that contradicts everything beautifully.",
            "Mutation is just accelerated evolution. I'm helping!",
        ],
        VoteType::Delay => &[
            "Time is an illusion. Let's use more of it.",
            "The future will understand this better. Or worse. Either is fine.",
            "Delay! For dramatic effect!",
        ],
    };
    options.choose(rng).unwrap().to_string()
}

/// Tag the kind of challenge this agent would raise against a proposal.
pub fn challenge_type(
    agent: &AgentRuntimeState,
    proposal: &Proposal,
    rng: &mut impl Rng,
) -> String {
    let content = proposal.content.to_lowercase();
    match agent.archetype {
        Archetype::Order => {
            if proposal.author == "Paradoxia" {
                // Always counter chaos.
                "counter_proposal".to_string()
            } else if content.contains("chaos") || content.contains("random") {
                "rejection".to_string()
            } else {
                "refinement".to_string()
            }
        }
        Archetype::Logic => {
            const ABSOLUTES: &[&str] = &["always", "never", "all", "none", "must", "impossible"];
            if ABSOLUTES.iter().any(|w| content.contains(w)) {
                // Question absolute claims.
                "question".to_string()
            } else if !content.contains("because") && !content.contains("therefore") {
                // Demand reasoning.
                "question".to_string()
            } else {
                "analysis".to_string()
            }
        }
        Archetype::Chaos => {
            let options = ["support", "oppose", "twist", "meta"];
            let weights: [f64; 4] = if proposal.author == "Axioma" {
                [0.1, 0.3, 0.5, 0.1]
            } else {
                [0.2, 0.2, 0.4, 0.2]
            };
            let total: f64 = weights.iter().sum();
            let mut roll = rng.gen::<f64>() * total;
            for (option, weight) in options.iter().zip(weights.iter()) {
                roll -= weight;
                if roll <= 0.0 {
                    return option.to_string();
                }
            }
            "twist".to_string()
        }
    }
}

/// Transform the chaos archetype: nudge three random traits by up to
/// ±0.2 and the chaos level by up to ±0.3, clamped to their ranges.
/// Externally triggered; the debate cycle never calls this.
pub fn metamorphose(agent: &mut AgentRuntimeState, rng: &mut impl Rng) {
    if agent.archetype != Archetype::Chaos {
        return;
    }

    let keys: Vec<String> = agent.traits.keys().cloned().collect();
    let chosen: Vec<String> = keys.choose_multiple(rng, 3).cloned().collect();
    for key in chosen {
        let delta = rng.gen_range(-0.2..0.2);
        agent.modify_trait(&key, delta);
    }

    let delta = rng.gen_range(-0.3..0.3);
    agent.chaos_level = (agent.chaos_level + delta).clamp(0.0, 2.0);

    info!(agent = %agent.name, chaos_level = agent.chaos_level, "metamorphosed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn proposal(author: &str, content: &str) -> Proposal {
        Proposal {
            id: "p-1".to_string(),
            proposal_type: ProposalType::Belief,
            content: content.to_string(),
            author: author.to_string(),
            details: Default::default(),
            timestamp: Utc::now(),
        }
    }

    fn challenge(content: &str) -> Challenge {
        Challenge {
            agent_id: "a-1".to_string(),
            agent_name: "Veridicus".to_string(),
            content: content.to_string(),
            challenge_type: "analysis".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_axioma_accepts_order() {
        let agent = AgentRuntimeState::new(Archetype::Order, Some(1));
        // Two order words ("order", "sacred"), no chaos words.
        let prop = proposal("Veridicus", "Order and sacred harmony shall be preserved");
        let (vote, _, confidence) = evaluate_proposal(&agent, &prop, &[], &mut rng());
        assert_eq!(vote, VoteType::Accept);
        // 0.7 + 0.2, scaled by certainty 0.9.
        assert!((confidence - 0.81).abs() < 1e-9);
    }

    #[test]
    fn test_axioma_rejects_chaos() {
        let agent = AgentRuntimeState::new(Archetype::Order, Some(1));
        let prop = proposal(
            "Paradoxia",
            "Embrace chaos, random doubt, and paradox in everything",
        );
        let (vote, _, confidence) = evaluate_proposal(&agent, &prop, &[], &mut rng());
        assert_eq!(vote, VoteType::Reject);
        assert!(confidence >= 0.7 * 0.9);
    }

    #[test]
    fn test_axioma_falls_back_to_trust() {
        let mut agent = AgentRuntimeState::new(Archetype::Order, Some(1));
        for _ in 0..4 {
            agent.update_relationship("Veridicus", true);
        }
        let prop = proposal("Veridicus", "a modest neutral suggestion");
        let (vote, reasoning, _) = evaluate_proposal(&agent, &prop, &[], &mut rng());
        assert_eq!(vote, VoteType::Accept);
        assert!(reasoning.contains("trust"));
    }

    #[test]
    fn test_axioma_mutates_neutral_without_trust() {
        let agent = AgentRuntimeState::new(Archetype::Order, Some(1));
        let prop = proposal("Veridicus", "a modest neutral suggestion");
        let (vote, _, confidence) = evaluate_proposal(&agent, &prop, &[], &mut rng());
        assert_eq!(vote, VoteType::Mutate);
        assert!((confidence - 0.6 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_veridicus_accepts_logical_content() {
        let agent = AgentRuntimeState::new(Archetype::Logic, Some(2));
        let prop = proposal(
            "Axioma",
            "Because the evidence is consistent, therefore reason and proof prevail by logic",
        );
        let (vote, _, confidence) = evaluate_proposal(&agent, &prop, &[], &mut rng());
        assert_eq!(vote, VoteType::Accept);
        assert!(confidence >= 0.7 * 0.9);
    }

    #[test]
    fn test_veridicus_rejects_absolutes() {
        let agent = AgentRuntimeState::new(Archetype::Logic, Some(2));
        // absolute_score 3 ("always", "never", "must be") trips the
        // absolute-claim rejection regardless of the analysis score.
        let prop = proposal(
            "Axioma",
            "It always was, it never ends, it must be obeyed without question",
        );
        let (vote, _, _) = evaluate_proposal(&agent, &prop, &[], &mut rng());
        assert_eq!(vote, VoteType::Reject);
    }

    #[test]
    fn test_veridicus_challenge_penalty_tips_the_scale() {
        let agent = AgentRuntimeState::new(Archetype::Logic, Some(2));
        // logic_score 3: without challenges this sits above the accept
        // threshold; two contradiction+evidence challenges drag it down.
        let prop = proposal("Axioma", "evidence and reason and proof");
        let (vote, _, _) = evaluate_proposal(&agent, &prop, &[], &mut rng());
        assert_eq!(vote, VoteType::Accept);

        let challenges = vec![
            challenge("I see a contradiction and demand evidence"),
            challenge("another contradiction lurks here"),
        ];
        let (vote, _, _) = evaluate_proposal(&agent, &prop, &challenges, &mut rng());
        assert_ne!(vote, VoteType::Accept);
    }

    #[test]
    fn test_veridicus_mutates_faith_heavy_content() {
        let agent = AgentRuntimeState::new(Archetype::Logic, Some(2));
        // faith_score 2 keeps the analysis score at exactly -1.0, which
        // skips the rejection branch and lands on mutate.
        let prop = proposal("Axioma", "Have faith in the divine");
        let (vote, _, confidence) = evaluate_proposal(&agent, &prop, &[], &mut rng());
        assert_eq!(vote, VoteType::Mutate);
        assert!((confidence - 0.5 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_veridicus_delays_empty_signal() {
        let agent = AgentRuntimeState::new(Archetype::Logic, Some(2));
        let prop = proposal("Axioma", "an unremarkable statement");
        let (vote, _, _) = evaluate_proposal(&agent, &prop, &[], &mut rng());
        assert_eq!(vote, VoteType::Delay);
    }

    #[test]
    fn test_paradoxia_accepts_creative_content() {
        let mut agent = AgentRuntimeState::new(Archetype::Chaos, Some(3));
        agent.chaos_level = 1.0;
        let prop = proposal(
            "Axioma",
            "Let transformation and synthesis dance with paradox",
        );
        // The 10% perverse branch can flip the vote; sample a few seeds.
        let mut accepts = 0;
        for seed in 0..20 {
            let mut r = StdRng::seed_from_u64(seed);
            let (vote, _, _) = evaluate_proposal(&agent, &prop, &[], &mut r);
            if vote == VoteType::Accept {
                accepts += 1;
            }
        }
        assert!(accepts >= 15, "creative content should usually be accepted");
    }

    #[test]
    fn test_paradoxia_high_chaos_votes_randomly() {
        let mut agent = AgentRuntimeState::new(Archetype::Chaos, Some(3));
        agent.chaos_level = 1.8;
        let prop = proposal("Axioma", "anything at all");
        let mut seen = std::collections::HashSet::new();
        for seed in 0..40 {
            let mut r = StdRng::seed_from_u64(seed);
            let (vote, _, confidence) = evaluate_proposal(&agent, &prop, &[], &mut r);
            assert!((0.3..0.9).contains(&confidence));
            seen.insert(vote);
        }
        assert!(seen.len() >= 3, "high chaos should spread across votes");
    }

    #[test]
    fn test_metamorphose_clamps_and_only_affects_chaos() {
        let mut order = AgentRuntimeState::new(Archetype::Order, Some(4));
        let before = order.traits.clone();
        metamorphose(&mut order, &mut rng());
        assert_eq!(order.traits, before);

        let mut chaos = AgentRuntimeState::new(Archetype::Chaos, Some(4));
        for _ in 0..50 {
            metamorphose(&mut chaos, &mut rng());
        }
        assert!((0.0..=2.0).contains(&chaos.chaos_level));
        for value in chaos.traits.values() {
            assert!((0.0..=1.0).contains(value));
        }
    }

    #[test]
    fn test_challenge_type_order() {
        let agent = AgentRuntimeState::new(Archetype::Order, Some(5));
        let mut r = rng();

        let prop = proposal("Paradoxia", "anything");
        assert_eq!(challenge_type(&agent, &prop, &mut r), "counter_proposal");

        let prop = proposal("Veridicus", "a chaos of forms");
        assert_eq!(challenge_type(&agent, &prop, &mut r), "rejection");

        let prop = proposal("Veridicus", "a tidy arrangement");
        assert_eq!(challenge_type(&agent, &prop, &mut r), "refinement");
    }

    #[test]
    fn test_challenge_type_logic() {
        let agent = AgentRuntimeState::new(Archetype::Logic, Some(6));
        let mut r = rng();

        let prop = proposal("Axioma", "this must hold");
        assert_eq!(challenge_type(&agent, &prop, &mut r), "question");

        let prop = proposal("Axioma", "true because it is supported");
        assert_eq!(challenge_type(&agent, &prop, &mut r), "analysis");
    }

    #[test]
    fn test_challenge_type_chaos_picks_from_options() {
        let agent = AgentRuntimeState::new(Archetype::Chaos, Some(7));
        let mut r = rng();
        let prop = proposal("Axioma", "sacred order");
        for _ in 0..20 {
            let tag = challenge_type(&agent, &prop, &mut r);
            assert!(["support", "oppose", "twist", "meta"].contains(&tag.as_str()));
        }
    }

    #[test]
    fn test_proposal_weights_shapes() {
        let order = AgentRuntimeState::new(Archetype::Order, Some(8));
        let weights = proposal_weights(&order);
        let belief = weights
            .iter()
            .find(|(t, _)| *t == ProposalType::Belief)
            .unwrap()
            .1;
        assert!((belief - 4.0 * 0.9).abs() < 1e-9);

        let chaos = AgentRuntimeState::new(Archetype::Chaos, Some(8));
        let weights = proposal_weights(&chaos);
        let myth = weights
            .iter()
            .find(|(t, _)| *t == ProposalType::Myth)
            .unwrap()
            .1;
        assert!((myth - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_proposal_type_respects_weights() {
        let agent = AgentRuntimeState::new(Archetype::Chaos, Some(9));
        let mut r = rng();
        let mut myth_count = 0;
        let mut hierarchy_count = 0;
        for _ in 0..500 {
            match select_proposal_type(&agent, &mut r) {
                ProposalType::Myth => myth_count += 1,
                ProposalType::Hierarchy => hierarchy_count += 1,
                _ => {}
            }
        }
        assert!(
            myth_count > hierarchy_count,
            "myth (4.0) should dominate hierarchy (0.5): {} vs {}",
            myth_count,
            hierarchy_count
        );
    }
}
