use crate::reference;
use crate::types::{ContextView, ConversationSession, ConversationTurn};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use sb_domain::config::SessionsConfig;
use sb_domain::trace::TraceEvent;
use std::collections::HashMap;
use std::sync::Arc;

type SessionHandle = Arc<Mutex<ConversationSession>>;

/// Context Manager (C3): session store, reference resolution, and topic
/// tracking.
///
/// The session map is guarded by a single reader/writer lock; each
/// session's mutable state is additionally guarded by its own mutex so
/// that turn appends on one session never block activity on another.
/// Session-map mutations (create, evict) hold the map lock only long
/// enough to insert or remove an entry.
pub struct ContextManager {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    config: SessionsConfig,
}

impl ContextManager {
    pub fn new(config: SessionsConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Validates `session_id` as a UUID if supplied; mints a fresh v4 id
    /// and logs the substitution if it is absent or malformed. Returns
    /// the resolved id, creating a session entry if one did not exist.
    pub fn get_or_create_session(&self, session_id: Option<&str>, user_id: Option<&str>) -> String {
        let resolved_id = match session_id {
            Some(id) if uuid::Uuid::parse_str(id).is_ok() => id.to_string(),
            Some(id) => {
                let minted = uuid::Uuid::new_v4().to_string();
                tracing::warn!(
                    supplied = %id,
                    minted = %minted,
                    "session_id was not a valid UUID; minting a fresh one"
                );
                minted
            }
            None => uuid::Uuid::new_v4().to_string(),
        };

        {
            let sessions = self.sessions.read();
            if let Some(handle) = sessions.get(&resolved_id) {
                handle.lock().last_activity = Utc::now();
                TraceEvent::SessionResolved {
                    session_id: resolved_id.clone(),
                    is_new: false,
                }
                .emit();
                return resolved_id;
            }
        }

        let session = ConversationSession::new(resolved_id.clone(), user_id.map(str::to_string));
        self.sessions
            .write()
            .insert(resolved_id.clone(), Arc::new(Mutex::new(session)));

        TraceEvent::SessionResolved {
            session_id: resolved_id.clone(),
            is_new: true,
        }
        .emit();

        // Opportunistic sweep: creating a session is a convenient, low-frequency
        // hook to catch expired entries between background sweep ticks.
        self.cleanup_expired();

        resolved_id
    }

    /// Appends a turn, updates `last_activity`, and refreshes active
    /// topics. No-op (with a warning) if the session does not exist.
    pub fn append_turn(
        &self,
        session_id: &str,
        user_query: &str,
        agent_name: &str,
        agent_response: &str,
        confidence: f32,
        metadata: serde_json::Value,
    ) {
        let handle = {
            let sessions = self.sessions.read();
            sessions.get(session_id).cloned()
        };
        let Some(handle) = handle else {
            tracing::warn!(session_id, "append_turn called for unknown session");
            return;
        };

        let mut session = handle.lock();
        session.turns.push(ConversationTurn {
            timestamp: Utc::now(),
            user_query: user_query.to_string(),
            agent_name: agent_name.to_string(),
            agent_response: agent_response.to_string(),
            routing_confidence: confidence,
            metadata,
        });
        session.last_activity = Utc::now();

        for topic in reference::topics_for(user_query, agent_response) {
            if !session.active_topics.contains(&topic) {
                session.active_topics.push(topic);
            }
        }
        let len = session.active_topics.len();
        if len > 5 {
            session.active_topics.drain(0..len - 5);
        }
    }

    /// Recent turns, summary, active topics, and last activity for a
    /// session. `None` if the session does not exist.
    pub fn get_context(&self, session_id: &str, last_n_turns: usize) -> Option<ContextView> {
        let handle = self.sessions.read().get(session_id).cloned()?;
        let session = handle.lock();
        let start = session.turns.len().saturating_sub(last_n_turns);
        Some(ContextView {
            session_id: session.session_id.clone(),
            turns: session.turns[start..].to_vec(),
            summary: session.context_summary.clone(),
            active_topics: session.active_topics.clone(),
            last_activity: session.last_activity,
        })
    }

    /// Resolves references in `user_query` against the session's most
    /// recent turn. Returns `user_query` unchanged if the session has no
    /// turns yet or the query carries no reference tokens.
    pub fn enrich_query(&self, session_id: &str, user_query: &str) -> String {
        let Some(handle) = self.sessions.read().get(session_id).cloned() else {
            return user_query.to_string();
        };
        let session = handle.lock();
        let Some(last_turn) = session.turns.last() else {
            return user_query.to_string();
        };
        if !reference::needs_resolution(user_query) {
            return user_query.to_string();
        }
        reference::resolve_references(user_query, last_turn)
    }

    /// Removes sessions whose `last_activity` is older than the
    /// configured timeout. Takes the map lock, then each candidate
    /// session's lock in turn — the same order `append_turn` observes, so
    /// eviction cannot deadlock against an in-flight query.
    pub fn cleanup_expired(&self) -> usize {
        let timeout = chrono::Duration::hours(self.config.session_timeout_hours);
        let now = Utc::now();

        let mut sessions = self.sessions.write();
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, handle)| now.signed_duration_since(handle.lock().last_activity) > timeout)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            sessions.remove(id);
        }

        if !expired.is_empty() {
            for id in &expired {
                TraceEvent::SessionEvicted {
                    session_id: id.clone(),
                    idle_seconds: timeout.num_seconds(),
                }
                .emit();
            }
        }

        expired.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}
