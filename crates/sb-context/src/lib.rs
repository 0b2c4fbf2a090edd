//! Context Manager (C3): per-session conversation tracking, reference
//! resolution, and topic tracking, kept entirely in memory.

mod manager;
mod reference;
mod types;

pub use manager::ContextManager;
pub use reference::{extract_main_topic, extract_subject, needs_resolution, resolve_references, topics_for};
pub use types::{ContextView, ConversationSession, ConversationTurn};
