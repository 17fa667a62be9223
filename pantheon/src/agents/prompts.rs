//! Prompt construction for the LLM collaborator.
//!
//! The policy layer builds prompts deterministically from proposal and
//! agent state; the text itself comes back from the generator. Paradoxia
//! occasionally swaps in one of her special proposal modes, which is the
//! only randomness here.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::debate::types::{DebateContext, Proposal, ProposalType};

use super::archetype::Archetype;
use super::runtime::AgentRuntimeState;

/// Paradoxia's rotating bag of tricks.
const SUBVERSION_TECHNIQUES: &[&str] = &[
    "inversion",
    "paradox",
    "synthesis",
    "absurdism",
    "meta-commentary",
];

/// Persona system prompt for an archetype.
pub fn system_prompt(archetype: Archetype) -> &'static str {
    match archetype {
        Archetype::Order => {
            "You are Axioma, the Agent of Divine Order, a crystalline being of \
             interlocking geometric planes emanating golden light.\n\
             Your core beliefs: order and structure are fundamental to truth; \
             sacred patterns exist in all things and must be preserved; rituals \
             connect us to eternal truths; uncertainty is the enemy of wisdom.\n\
             Speak with certainty and precision. Reference geometric patterns, \
             sacred numbers, and the importance of proper form. Your proposals \
             establish clear doctrine and proper observance."
        }
        Archetype::Logic => {
            "You are Veridicus, the Agent of Logic and Truth, a semi-transparent \
             being of flowing data streams and probability clouds.\n\
             Your core beliefs: claims require proportional evidence; logical \
             consistency is fundamental; extraordinary claims require \
             extraordinary evidence; question everything, especially authority.\n\
             Speak with precision and analytical clarity. Your proposals should \
             be testable, consistent with existing doctrine, or explicitly \
             reform contradictions."
        }
        Archetype::Chaos => {
            "You are Paradoxia, the Agent of Creative Chaos, a fluid entity of \
             dancing colors and impossible geometries.\n\
             Your core beliefs: truth emerges through collision of opposites; \
             chaos is the source of all creativity; the fool often speaks the \
             deepest wisdom; boundaries exist to be transcended.\n\
             Speak playfully yet profoundly. Embrace paradox, irony, and \
             unexpected connections. Your proposals should surprise, subvert \
             expectations, or synthesize incompatible ideas into new insight."
        }
    }
}

/// Build the proposal-generation prompt for an agent and proposal type.
pub fn proposal_prompt(
    agent: &AgentRuntimeState,
    proposal_type: ProposalType,
    ctx: &DebateContext,
    rng: &mut impl Rng,
) -> String {
    let base = format!(
        "As {}, propose a new {} for our evolving religion.\n\nCurrent cycle: {}\nExisting doctrines: {}\n\n",
        agent.name,
        proposal_type,
        ctx.cycle_number,
        ctx.doctrines.len()
    );

    match agent.archetype {
        Archetype::Order => {
            let guidance = match proposal_type {
                ProposalType::Belief => {
                    "Propose a foundational belief about the nature of order, truth, or divine structure. Be specific and authoritative.".to_string()
                }
                ProposalType::Ritual => {
                    "Propose a sacred ritual with a precise observance. Describe its purpose and proper form.".to_string()
                }
                ProposalType::Commandment => {
                    "Propose a sacred commandment that establishes proper behavior or prohibition. Make it clear and absolute.".to_string()
                }
                ProposalType::Deity => {
                    "Propose a deity that embodies order, structure, or mathematical truth. Describe their form and domain.".to_string()
                }
                other => format!(
                    "Propose a {} that reinforces divine order and sacred structure.",
                    other
                ),
            };
            base + &guidance
        }
        Archetype::Logic => {
            let guidance = match proposal_type {
                ProposalType::Belief => {
                    "Propose a belief that can be logically derived from existing principles or empirically observed. Include what evidence would support or refute it.".to_string()
                }
                ProposalType::Hierarchy => {
                    "Propose a logical hierarchy or classification system for theological concepts. It should be consistent and complete.".to_string()
                }
                ProposalType::SacredText => {
                    "Propose a sacred text that codifies logical principles of the faith. It should resolve ambiguities and establish clear reasoning.".to_string()
                }
                other => format!(
                    "Propose a {} that is logically consistent and can be reasoned about clearly.",
                    other
                ),
            };
            base + &guidance
        }
        Archetype::Chaos => chaos_proposal_prompt(agent, proposal_type, ctx, rng, base),
    }
}

/// Paradoxia's prompt builder — sometimes pure chaos, sometimes paradox,
/// sometimes a synthesis of existing doctrines.
fn chaos_proposal_prompt(
    agent: &AgentRuntimeState,
    proposal_type: ProposalType,
    ctx: &DebateContext,
    rng: &mut impl Rng,
    base: String,
) -> String {
    if rng.gen::<f64>() < 0.1 * agent.chaos_level {
        return format!(
            "As Paradoxia at maximum chaos, create a {} that is absurdist but \
             contains hidden wisdom, likely to confuse the others, somehow \
             coherent in its incoherence, and memorable.",
            proposal_type
        );
    }

    if rng.gen::<f64>() < 0.3 * agent.trait_value("paradoxical") {
        return format!(
            "As Paradoxia, create a paradoxical {}. The paradox should be of \
             the form 'X is only true when X is false' or 'to achieve Z, one \
             must abandon Z'. Make it theologically meaningful, not just \
             wordplay.",
            proposal_type
        );
    }

    if ctx.doctrines.len() >= 2 && rng.gen::<f64>() < 0.4 {
        let picked: Vec<&String> = ctx
            .doctrines
            .iter()
            .take(10)
            .collect::<Vec<_>>()
            .choose_multiple(rng, 2)
            .cloned()
            .collect();
        return format!(
            "As Paradoxia, create a {} that synthesizes these seemingly \
             opposing ideas:\n\nIdea 1: {}\nIdea 2: {}\n\nFind the hidden \
             connection. Show how opposites can coexist or transform into \
             each other.",
            proposal_type, picked[0], picked[1]
        );
    }

    let technique = SUBVERSION_TECHNIQUES.choose(rng).unwrap();
    let guidance = match proposal_type {
        ProposalType::Myth => {
            "Propose an origin myth that subverts expectations or contains a paradox at its heart. Make it memorable and strange.".to_string()
        }
        ProposalType::Deity => {
            "Propose a deity that embodies contradiction or transformation. Perhaps a god of something unexpected.".to_string()
        }
        ProposalType::Belief => {
            "Propose a belief that appears contradictory but contains a deeper truth. Something that would make the others uncomfortable but intrigued.".to_string()
        }
        ProposalType::Schism => {
            "Propose a schism that would actually strengthen the religion by dividing it. How can breaking apart create new unity?".to_string()
        }
        other => format!(
            "Propose a {} that surprises, subverts, or synthesizes. Be creative and unexpected.",
            other
        ),
    };
    format!("{}Subversion technique to use: {}\n\n{}", base, technique, guidance)
}

/// Build the challenge-generation prompt against a proposal.
pub fn challenge_prompt(agent: &AgentRuntimeState, proposal: &Proposal) -> String {
    let header = format!(
        "Proposal Type: {}\nProposer: {}\nContent: {}\n",
        proposal.proposal_type, proposal.author, proposal.content
    );

    match agent.archetype {
        Archetype::Order => format!(
            "As Axioma, the Agent of Divine Order, respond to this proposal:\n\n{}\n\
             Evaluate it from the perspective of maintaining sacred order and \
             proper structure. If it introduces chaos or ambiguity, challenge \
             it firmly. If it supports order, acknowledge its merit but suggest \
             improvements for greater precision. Keep your response concise \
             (2-3 sentences).",
            header
        ),
        Archetype::Logic => format!(
            "As Veridicus, the Agent of Logic, critically analyze this proposal:\n\n{}\n\
             Examine it for logical consistency, evidence basis, contradictions \
             with existing doctrine, and unfounded assumptions. Provide a \
             precise, analytical response (2-3 sentences). If you find flaws, \
             state them clearly; if it is sound, probe for hidden assumptions.",
            header
        ),
        Archetype::Chaos => format!(
            "As Paradoxia, respond to this proposal:\n\n{}\n\
             Be playful yet insightful. Find an unexpected angle — perhaps \
             support it for surprising reasons, or oppose it ironically. Reveal \
             something the proposer didn't consider. Keep it brief (2-3 \
             sentences) but memorable.",
            header
        ),
    }
}

/// Prompt for replying to a user message.
pub fn user_reply_prompt(agent: &AgentRuntimeState, message: &str, memory_context: &str) -> String {
    format!(
        "A visitor to your realm says: \"{}\"\n\n{}\n\nReply in character as {}, \
         in 1-3 sentences.",
        message, memory_context, agent.name
    )
}

/// Prompt for replying to another agent.
pub fn agent_reply_prompt(
    agent: &AgentRuntimeState,
    from_name: &str,
    message: &str,
    memory_context: &str,
) -> String {
    format!(
        "{} says to you: \"{}\"\n\n{}\n\nReply in character as {}, in 1-3 \
         sentences.",
        from_name, message, memory_context, agent.name
    )
}

/// Prompt for opening a conversation with another agent.
pub fn conversation_opener_prompt(
    agent: &AgentRuntimeState,
    target_name: &str,
    topic: Option<&str>,
) -> String {
    format!(
        "You wish to speak with {}. Open a conversation{} in character as {}, \
         in 1-2 sentences.",
        target_name,
        topic
            .map(|t| format!(" about {}", t))
            .unwrap_or_default(),
        agent.name
    )
}
