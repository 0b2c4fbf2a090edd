//! JSON-RPC surface at `/` (spec §4.6): the same `message/send`/
//! `tasks/get` shapes the orchestrator speaks as a client of downstream
//! agents, so external A2A-style clients can talk to it too. Three
//! distinguished request texts carry in-band registry control.

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use sb_protocol::{Artifact, JsonRpcRequest, JsonRpcResponse, Message, Part, Task, TaskState, TaskStatus};

use crate::state::AppState;

const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const TASK_NOT_FOUND: i64 = -32001;

pub async fn rpc(State(state): State<AppState>, Json(req): Json<JsonRpcRequest>) -> impl IntoResponse {
    let response = match req.method.as_str() {
        "message/send" => handle_send(&state, &req).await,
        "tasks/get" => handle_get(&state, &req),
        other => JsonRpcResponse::failure(req.id.clone(), METHOD_NOT_FOUND, format!("method not found: {other}")),
    };
    Json(response)
}

async fn handle_send(state: &AppState, req: &JsonRpcRequest) -> JsonRpcResponse {
    let Some(text) = extract_text(&req.params) else {
        return JsonRpcResponse::failure(req.id.clone(), INVALID_PARAMS, "message has no text part");
    };

    let task_id = req
        .params
        .get("id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let session_id = req
        .params
        .get("message")
        .and_then(|m| m.get("contextId"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    if text == "LIST_AGENTS" {
        let summary = serde_json::to_string_pretty(&state.registry.list()).unwrap_or_default();
        return JsonRpcResponse::success(req.id.clone(), text_message(&summary));
    }

    if let Some(url) = text.strip_prefix("REGISTER_AGENT:") {
        let url = url.trim();
        let body = match state.card_client.fetch(url).await {
            Ok(card) => {
                let name = card.name.clone();
                state.registry.add(card);
                format!("registered {name} at {url}")
            }
            Err(e) => format!("registration failed: {e}"),
        };
        return JsonRpcResponse::success(req.id.clone(), text_message(&body));
    }

    if let Some(identifier) = text.strip_prefix("UNREGISTER_AGENT:") {
        let body = match state.registry.remove(identifier.trim()) {
            Some(card) => format!("unregistered {}", card.name),
            None => "NOT_FOUND".to_string(),
        };
        return JsonRpcResponse::success(req.id.clone(), text_message(&body));
    }

    let (session_id, enriched, context_enriched, decision) =
        crate::api::query::route(state, &text, session_id.as_deref()).await;
    let routed = decision.agent_id.is_some();
    let response =
        crate::api::query::finish(state, &session_id, &text, &enriched, context_enriched, decision).await;

    if !routed {
        return JsonRpcResponse::success(req.id.clone(), text_message(&response.response));
    }

    let task = if response.success {
        Task {
            id: task_id.clone(),
            context_id: Some(session_id),
            status: TaskStatus {
                state: TaskState::Completed,
                message: None,
            },
            artifacts: vec![Artifact {
                name: None,
                parts: vec![Part::Text {
                    text: response.response,
                }],
            }],
        }
    } else {
        Task {
            id: task_id.clone(),
            context_id: Some(session_id),
            status: TaskStatus {
                state: TaskState::Failed,
                message: Some(Message {
                    role: "agent".to_string(),
                    message_id: uuid::Uuid::new_v4().to_string(),
                    context_id: None,
                    parts: vec![Part::Text {
                        text: response.error.unwrap_or_else(|| "transport error".to_string()),
                    }],
                }),
            },
            artifacts: vec![],
        }
    };

    state.rpc_tasks.lock().insert(task_id, task.clone());
    JsonRpcResponse::success(req.id.clone(), serde_json::to_value(&task).unwrap_or(serde_json::Value::Null))
}

fn handle_get(state: &AppState, req: &JsonRpcRequest) -> JsonRpcResponse {
    let Some(id) = req.params.get("id").and_then(|v| v.as_str()) else {
        return JsonRpcResponse::failure(req.id.clone(), INVALID_PARAMS, "missing task id");
    };
    match state.rpc_tasks.lock().get(id) {
        Some(task) => JsonRpcResponse::success(req.id.clone(), serde_json::to_value(task).unwrap_or(serde_json::Value::Null)),
        None => JsonRpcResponse::failure(req.id.clone(), TASK_NOT_FOUND, "task not found"),
    }
}

fn text_message(body: &str) -> serde_json::Value {
    let message = Message {
        role: "agent".to_string(),
        message_id: uuid::Uuid::new_v4().to_string(),
        context_id: None,
        parts: vec![Part::Text { text: body.to_string() }],
    };
    serde_json::to_value(&message).unwrap_or(serde_json::Value::Null)
}

fn extract_text(params: &serde_json::Value) -> Option<String> {
    let parts = params.get("message")?.get("parts")?.as_array()?;
    let mut text = String::new();
    for part in parts {
        if part.get("type").and_then(|v| v.as_str()) == Some("text") {
            if let Some(t) = part.get("text").and_then(|v| v.as_str()) {
                text.push_str(t);
            }
        }
    }
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_text_reads_text_parts() {
        let params = serde_json::json!({
            "message": {"parts": [{"type": "text", "text": "hello"}]}
        });
        assert_eq!(extract_text(&params), Some("hello".to_string()));
    }

    #[test]
    fn extract_text_none_when_missing() {
        let params = serde_json::json!({"message": {"parts": []}});
        assert_eq!(extract_text(&params), None);
    }
}
