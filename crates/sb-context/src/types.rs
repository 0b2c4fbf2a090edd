use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One exchange between the user and a downstream agent. `user_query` is
/// always the original text the user sent, never the enriched form that
/// was actually routed — enrichment is reconstructible but the original
/// is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub timestamp: DateTime<Utc>,
    pub user_query: String,
    pub agent_name: String,
    pub agent_response: String,
    pub routing_confidence: f32,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A bounded conversation history keyed by session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub session_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    #[serde(default)]
    pub turns: Vec<ConversationTurn>,
    /// Capped at 5 entries, most-recently-seen topics retained.
    #[serde(default)]
    pub active_topics: Vec<String>,
    #[serde(default)]
    pub context_summary: Option<String>,
}

impl ConversationSession {
    pub fn new(session_id: String, user_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            user_id,
            created_at: now,
            last_activity: now,
            turns: Vec::new(),
            active_topics: Vec::new(),
            context_summary: None,
        }
    }
}

/// A read-only view returned by `ContextManager::get_context`.
#[derive(Debug, Clone, Serialize)]
pub struct ContextView {
    pub session_id: String,
    pub turns: Vec<ConversationTurn>,
    pub summary: Option<String>,
    pub active_topics: Vec<String>,
    pub last_activity: DateTime<Utc>,
}
