//! Agent Registry management surface: spec §4.6's REST table
//! (`register`, `unregister`, `list`, `health`).

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AgentOpResponse {
    pub success: bool,
    pub agent_id: String,
    pub agent_name: String,
    pub endpoint: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub endpoint: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> impl IntoResponse {
    match state.card_client.fetch(&body.endpoint).await {
        Ok(card) => {
            let agent_id = card.name.clone();
            let endpoint = card.url.clone();
            state.registry.add(card);
            Json(AgentOpResponse {
                success: true,
                agent_id: agent_id.clone(),
                agent_name: agent_id,
                endpoint,
                message: "agent registered".to_string(),
                error: None,
            })
        }
        Err(e) => Json(AgentOpResponse {
            success: false,
            agent_id: String::new(),
            agent_name: String::new(),
            endpoint: body.endpoint,
            message: "agent registration failed".to_string(),
            error: Some(e.to_string()),
        }),
    }
}

#[derive(Debug, Deserialize)]
pub struct UnregisterRequest {
    pub agent_identifier: String,
}

pub async fn unregister(
    State(state): State<AppState>,
    Json(body): Json<UnregisterRequest>,
) -> impl IntoResponse {
    match state.registry.remove(&body.agent_identifier) {
        Some(card) => Json(AgentOpResponse {
            success: true,
            agent_id: card.name.clone(),
            agent_name: card.name,
            endpoint: card.url,
            message: "agent unregistered".to_string(),
            error: None,
        }),
        None => Json(AgentOpResponse {
            success: false,
            agent_id: String::new(),
            agent_name: String::new(),
            endpoint: String::new(),
            message: "agent not found".to_string(),
            error: Some("NOT_FOUND".to_string()),
        }),
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub agents: Vec<sb_registry::AgentSummary>,
    pub total_count: usize,
    pub message: String,
}

pub async fn list(State(state): State<AppState>) -> impl IntoResponse {
    let agents = state.registry.list();
    let total_count = agents.len();
    Json(ListResponse {
        success: true,
        agents,
        total_count,
        message: "ok".to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}
