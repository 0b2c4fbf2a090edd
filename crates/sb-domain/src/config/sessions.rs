use serde::{Deserialize, Serialize};

/// Bounds on the in-memory conversation context kept per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    #[serde(default = "d_session_timeout_hours")]
    pub session_timeout_hours: i64,

    #[serde(default = "d_max_active_topics")]
    pub max_active_topics: usize,

    #[serde(default = "d_recent_turns_for_payload")]
    pub recent_turns_for_payload: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            session_timeout_hours: d_session_timeout_hours(),
            max_active_topics: d_max_active_topics(),
            recent_turns_for_payload: d_recent_turns_for_payload(),
        }
    }
}

fn d_session_timeout_hours() -> i64 {
    24
}
fn d_max_active_topics() -> usize {
    5
}
fn d_recent_turns_for_payload() -> usize {
    5
}
