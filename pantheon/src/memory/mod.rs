//! Per-agent interaction memory.

pub mod interactions;

pub use interactions::{
    Conversation, EmotionalState, Interaction, InteractionMemory, InteractionType, RecallFilter,
};
