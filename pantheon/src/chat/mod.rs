//! Chat and autonomous-action dispatch.

pub mod dispatch;

pub use dispatch::{ChatDispatcher, ChatUser, ConversationEntry};
