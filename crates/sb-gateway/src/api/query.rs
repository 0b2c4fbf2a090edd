//! Query lifecycle (spec §4.6): resolve session, enrich, route, forward,
//! record the turn. `query` returns the full result in one response;
//! `query_stream` narrates the same lifecycle as server-sent events.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json};
use futures_util::stream;
use sb_context::ConversationTurn;
use sb_routing::RoutingDecision;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct QueryResponse {
    pub success: bool,
    pub response: String,
    pub selected_agent_id: String,
    pub selected_agent_name: String,
    pub confidence: f32,
    pub reasoning: String,
    pub session_id: String,
    pub context_enriched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn query(State(state): State<AppState>, Json(body): Json<QueryRequest>) -> impl IntoResponse {
    let (session_id, enriched, context_enriched, decision) =
        route(&state, &body.query, body.session_id.as_deref()).await;
    let response = finish(&state, &session_id, &body.query, &enriched, context_enriched, decision).await;
    Json(response)
}

pub async fn query_stream(
    State(state): State<AppState>,
    Json(body): Json<QueryRequest>,
) -> impl IntoResponse {
    let (session_id, enriched, context_enriched, decision) =
        route(&state, &body.query, body.session_id.as_deref()).await;

    let status_event = Ok(Event::default().event("status").data("routing"));

    let metadata_event = Ok(Event::default().event("metadata").data(
        serde_json::json!({
            "selected_agent_id": decision.agent_id.clone().unwrap_or_default(),
            "confidence": decision.confidence,
            "reasoning": decision.reasoning,
        })
        .to_string(),
    ));

    let response = finish(&state, &session_id, &body.query, &enriched, context_enriched, decision).await;

    let tail_event = if response.success {
        Ok(Event::default()
            .event("chunk")
            .data(response.response.clone()))
    } else {
        Ok(Event::default()
            .event("error")
            .data(response.error.clone().unwrap_or_default()))
    };

    let done_event = Ok(Event::default()
        .event("done")
        .data(serde_json::to_string(&response).unwrap_or_default()));

    let events: Vec<Result<Event, Infallible>> =
        vec![status_event, metadata_event, tail_event, done_event];

    Sse::new(stream::iter(events)).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// Steps 1–4 of the query lifecycle: resolve the session, enrich the
/// query, and run routing. Pure with respect to session/turn state aside
/// from session creation — no turn is appended here. Returns the enriched
/// query alongside the session id and routing decision so the caller can
/// forward the enriched text downstream while still recording the
/// original query on the turn.
pub(crate) async fn route(
    state: &AppState,
    query_text: &str,
    session_id: Option<&str>,
) -> (String, String, bool, RoutingDecision) {
    let session_id = state.context.get_or_create_session(session_id, None);
    let enriched = state.context.enrich_query(&session_id, query_text);
    let context_enriched = enriched != query_text;

    let snapshot = state.registry.snapshot();
    let skill_keywords = state.registry.skill_keywords();
    let decision = state
        .router
        .select(&enriched, &snapshot, &skill_keywords, &state.config.routing);

    (session_id, enriched, context_enriched, decision)
}

/// Steps 4–8: dispatch to the selected agent (if any) and append the
/// turn. No-op transport call and no turn append when routing declined.
/// `enriched_query` (context-resolved) is what gets forwarded to the
/// agent; `original_query` (as the user typed it) is what gets recorded
/// on the turn.
pub(crate) async fn finish(
    state: &AppState,
    session_id: &str,
    original_query: &str,
    enriched_query: &str,
    context_enriched: bool,
    decision: RoutingDecision,
) -> QueryResponse {
    let Some(agent_id) = decision.agent_id.clone() else {
        return QueryResponse {
            success: true,
            response: decision.reasoning.clone(),
            selected_agent_id: String::new(),
            selected_agent_name: String::new(),
            confidence: 0.0,
            reasoning: decision.reasoning,
            session_id: session_id.to_string(),
            context_enriched,
            error: None,
        };
    };

    let Some(card) = state.registry.lookup_by_id(&agent_id) else {
        return QueryResponse {
            success: false,
            response: String::new(),
            selected_agent_id: agent_id.clone(),
            selected_agent_name: agent_id,
            confidence: decision.confidence,
            reasoning: decision.reasoning,
            session_id: session_id.to_string(),
            context_enriched,
            error: Some("selected agent vanished from the registry".to_string()),
        };
    };

    let recent_turns = state
        .context
        .get_context(session_id, 3)
        .map(|ctx| ctx.turns)
        .unwrap_or_default();
    let payload = build_payload(enriched_query, &recent_turns);

    match state
        .transport
        .send_and_poll(&card.url, &payload, session_id, &state.config.transport)
        .await
    {
        Ok(outcome) => {
            let metadata = serde_json::to_value(&decision.diagnostics).unwrap_or(serde_json::Value::Null);
            state.context.append_turn(
                session_id,
                original_query,
                &card.name,
                &outcome.text,
                decision.confidence,
                metadata,
            );
            QueryResponse {
                success: true,
                response: outcome.text,
                selected_agent_id: card.name.clone(),
                selected_agent_name: card.name,
                confidence: decision.confidence,
                reasoning: decision.reasoning,
                session_id: session_id.to_string(),
                context_enriched,
                error: None,
            }
        }
        Err(e) => QueryResponse {
            success: false,
            response: String::new(),
            selected_agent_id: card.name.clone(),
            selected_agent_name: card.name,
            confidence: decision.confidence,
            reasoning: decision.reasoning,
            session_id: session_id.to_string(),
            context_enriched,
            error: Some(e.to_string()),
        },
    }
}

const REPORT_INTENT_WORDS: &[&str] = &["report", "generate", "create", "make"];
const DATA_SOURCE_MARKERS: &[&str] = &["rag", "search", "query", "weather"];

fn is_report_intent(query: &str) -> bool {
    let lower = query.to_lowercase();
    REPORT_INTENT_WORDS.iter().any(|w| lower.contains(w))
}

fn is_data_source_agent(agent_name: &str) -> bool {
    let lower = agent_name.to_lowercase();
    DATA_SOURCE_MARKERS.iter().any(|m| lower.contains(m))
}

fn instruction_for(query: &str) -> &'static str {
    let lower = query.to_lowercase();
    if lower.contains("report") || lower.contains("generate") {
        "Please generate a comprehensive report based on the above context."
    } else if lower.contains("analyze") {
        "Please provide a detailed analysis based on the above context."
    } else if lower.contains("summarize") {
        "Please provide a concise summary based on the above context."
    } else {
        "Please respond based on the above context."
    }
}

/// Composes the text forwarded to the selected agent: the (context-enriched)
/// query, preceded by a "Previous conversation" block when prior turns
/// exist, plus a "Detailed data from most recent query" block when the
/// request reads as a report ask following a data-source agent's turn.
fn build_payload(query_text: &str, recent_turns: &[ConversationTurn]) -> String {
    if recent_turns.is_empty() {
        return query_text.to_string();
    }

    let mut payload = String::from("Previous conversation:\n");
    for turn in recent_turns {
        payload.push_str(&format!(
            "User: {}\n{}: {}\n",
            turn.user_query, turn.agent_name, turn.agent_response
        ));
    }
    payload.push('\n');

    if is_report_intent(query_text) {
        if let Some(last) = recent_turns.last() {
            if is_data_source_agent(&last.agent_name) {
                payload.push_str("Detailed data from most recent query:\n");
                payload.push_str(&last.agent_response);
                payload.push_str("\n\n");
            }
        }
    }

    payload.push_str(query_text);
    payload.push('\n');
    payload.push_str(instruction_for(query_text));
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn turn(user_query: &str, agent_name: &str, agent_response: &str) -> ConversationTurn {
        ConversationTurn {
            timestamp: Utc::now(),
            user_query: user_query.into(),
            agent_name: agent_name.into(),
            agent_response: agent_response.into(),
            routing_confidence: 0.9,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn no_turns_forwards_query_unchanged() {
        assert_eq!(build_payload("hello", &[]), "hello");
    }

    #[test]
    fn includes_previous_conversation_block_when_turns_exist() {
        let turns = vec![turn("weather in Boston?", "weather_agent", "sunny")];
        let payload = build_payload("and tomorrow?", &turns);
        assert!(payload.contains("Previous conversation:"));
        assert!(payload.contains("weather_agent: sunny"));
    }

    #[test]
    fn includes_detailed_data_block_for_report_after_data_source_agent() {
        let turns = vec![turn(
            "how was the winter in New York",
            "weather_rag_agent",
            "Winter in NYC averaged -2C",
        )];
        let payload = build_payload("Generate a report on it", &turns);
        assert!(payload.contains("Detailed data from most recent query:"));
        assert!(payload.contains("Winter in NYC averaged -2C"));
    }

    #[test]
    fn omits_detailed_data_block_when_prior_agent_is_not_a_data_source() {
        let turns = vec![turn("hi", "greeter_agent", "hello there")];
        let payload = build_payload("Generate a report on it", &turns);
        assert!(!payload.contains("Detailed data from most recent query:"));
    }

    #[test]
    fn instruction_sentence_matches_intent_class() {
        assert!(instruction_for("please analyze this").contains("analysis"));
        assert!(instruction_for("summarize this").contains("summary"));
        assert!(instruction_for("generate X").contains("report"));
        assert!(instruction_for("what is up").contains("respond"));
    }
}
