use serde::Serialize;

/// Structured trace events emitted across Switchboard crates.
///
/// Each variant is logged via a single `tracing::info!` call carrying the
/// event as a JSON blob under the `trace_event` field, so downstream log
/// aggregators can filter on `event` without parsing free-text messages.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    AgentRegistered {
        agent_id: String,
        name: String,
        url: String,
        skill_count: usize,
    },
    AgentRemoved {
        agent_id: String,
        name: String,
    },
    RoutingDecision {
        request_len: usize,
        candidate_count: usize,
        selected_agent: Option<String>,
        confidence: f32,
        reasoning: String,
    },
    TransportDispatched {
        endpoint: String,
        task_id: String,
        terminal_state: String,
        poll_attempts: u32,
    },
    SessionResolved {
        session_id: String,
        is_new: bool,
    },
    SessionEvicted {
        session_id: String,
        idle_seconds: i64,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "sb_event");
    }
}
