//! End-to-end scenarios over the public gateway surface: bootstrap,
//! routing with reference resolution, polling, and agent management.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Json, State};
use axum::response::IntoResponse;
use parking_lot::Mutex;
use sb_context::ContextManager;
use sb_domain::Config;
use sb_gateway::api::{agents, query, rpc};
use sb_gateway::state::AppState;
use sb_protocol::{AgentCard, AgentCardCapabilities, Skill};
use sb_registry::{AgentCardClient, AgentRegistry};
use sb_routing::RoutingEngine;
use sb_transport::TaskTransport;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn card(name: &str, url: &str, skill_name: &str, tags: &[&str], description: &str) -> AgentCard {
    AgentCard {
        name: name.to_string(),
        description: description.to_string(),
        url: url.to_string(),
        version: "1.0".to_string(),
        capabilities: AgentCardCapabilities::default(),
        skills: vec![Skill {
            id: skill_name.to_string(),
            name: skill_name.to_string(),
            description: description.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            examples: vec![],
        }],
        default_input_modes: vec![],
        default_output_modes: vec![],
    }
}

fn test_state() -> AppState {
    let config = Arc::new(Config::default());
    AppState {
        registry: Arc::new(AgentRegistry::new()),
        card_client: Arc::new(AgentCardClient::new(config.transport.card_fetch_timeout_secs).unwrap()),
        router: Arc::new(RoutingEngine::new()),
        transport: Arc::new(TaskTransport::new(config.transport.send_timeout_secs).unwrap()),
        context: Arc::new(ContextManager::new(config.sessions.clone())),
        rpc_tasks: Arc::new(Mutex::new(HashMap::new())),
        config,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn ask(state: &AppState, query_text: &str, session_id: Option<&str>) -> serde_json::Value {
    let resp = query::query(
        State(state.clone()),
        Json(query::QueryRequest {
            query: query_text.to_string(),
            session_id: session_id.map(str::to_string),
        }),
    )
    .await
    .into_response();
    body_json(resp).await
}

#[tokio::test]
async fn bootstrap_registers_reachable_agents_and_routes_correctly() {
    let weather_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/agent.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(card(
            "weather_agent",
            &weather_server.uri(),
            "weather_forecast",
            &["weather", "forecast"],
            "forecast temperature and climate conditions",
        )))
        .mount(&weather_server)
        .await;

    let math_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/agent.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(card(
            "math_agent",
            &math_server.uri(),
            "calculator",
            &["calculate", "math"],
            "adds subtracts multiplies divides numbers",
        )))
        .mount(&math_server)
        .await;

    // The weather agent also answers `message/send` for the routing check below.
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"method": "message/send"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "role": "agent",
                "messageId": "m1",
                "parts": [{"kind": "text", "text": "Sunny in Boston"}]
            }
        })))
        .mount(&weather_server)
        .await;

    let mut state = test_state();
    state.config = Arc::new(Config {
        bootstrap: sb_domain::config::BootstrapConfig {
            default_agents: vec![weather_server.uri(), math_server.uri()],
        },
        ..Config::default()
    });

    sb_gateway::bootstrap::run(&state).await;
    assert_eq!(state.registry.len(), 2);

    let list_body = body_json(agents::list(State(state.clone())).await.into_response()).await;
    assert_eq!(list_body["total_count"], 2);

    let body = ask(&state, "what's the weather in Boston", None).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["selected_agent_name"], "weather_agent");
}

#[tokio::test]
async fn reference_resolution_enriches_followup_across_turns() {
    let agent_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"method": "message/send"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "role": "agent",
                "messageId": "m1",
                "parts": [{"kind": "text", "text": "Sunny in Boston, 72F"}]
            }
        })))
        .mount(&agent_server)
        .await;

    let state = test_state();
    state.registry.add(card(
        "weather_agent",
        &agent_server.uri(),
        "weather_forecast",
        &["weather", "forecast"],
        "forecast temperature and climate conditions",
    ));

    let first = ask(&state, "what's the weather in Boston", None).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["context_enriched"], false);
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let second = ask(&state, "will it rain there tomorrow?", Some(&session_id)).await;
    assert_eq!(second["session_id"], session_id);
    assert_eq!(
        second["context_enriched"], true,
        "a pronoun reference after a prior turn should be flagged as enriched"
    );
}

#[tokio::test]
async fn empty_registry_declines_routing() {
    let state = test_state();
    let body = ask(&state, "anything at all", None).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["response"], body["reasoning"]);
    assert_eq!(body["selected_agent_id"], "");
}

#[tokio::test]
async fn task_polling_runs_to_completion_after_four_polls() {
    let agent_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"method": "message/send"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"id": "task-1", "status": {"state": "working"}, "artifacts": []}
        })))
        .mount(&agent_server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"method": "tasks/get"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"id": "task-1", "status": {"state": "working"}, "artifacts": []}
        })))
        .up_to_n_times(3)
        .with_priority(1)
        .mount(&agent_server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"method": "tasks/get"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "id": "task-1",
                "status": {"state": "completed"},
                "artifacts": [{"parts": [{"kind": "text", "text": "42"}]}]
            }
        })))
        .with_priority(2)
        .mount(&agent_server)
        .await;

    let mut config = sb_domain::config::TransportConfig::default();
    config.poll_interval_secs = 1;
    config.poll_timeout_secs = 30;

    let transport = TaskTransport::new(config.send_timeout_secs).unwrap();
    let start = Instant::now();
    let outcome = transport
        .send_and_poll(&agent_server.uri(), "what is 6 times 7", "session-1", &config)
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(outcome.poll_attempts, 4);
    assert_eq!(outcome.text, "42");
    assert!(elapsed >= Duration::from_secs(3), "expected wall clock >= 3x poll interval, got {elapsed:?}");
}

#[tokio::test]
async fn failed_task_surfaces_as_successful_transport_result() {
    let agent_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"method": "message/send"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "id": "task-1",
                "status": {
                    "state": "failed",
                    "message": {
                        "role": "agent",
                        "messageId": "m1",
                        "parts": [{"kind": "text", "text": "could not parse the request"}]
                    }
                },
                "artifacts": []
            }
        })))
        .mount(&agent_server)
        .await;

    let state = test_state();
    state.registry.add(card(
        "calc_agent",
        &agent_server.uri(),
        "calculator",
        &["calculate", "math"],
        "adds and subtracts numbers",
    ));

    let body = ask(&state, "please calculate something", None).await;
    let response = body["response"].as_str().unwrap();

    assert_eq!(body["success"], true);
    assert!(response.starts_with("Agent reported failure"));
    assert!(response.contains("could not parse the request"));
}

#[tokio::test]
async fn unregister_by_url_substring_via_rest_handler() {
    let state = test_state();
    state
        .registry
        .add(card("weather_agent", "http://localhost:8002", "weather_forecast", &["weather"], "forecasts"));

    let body = body_json(
        agents::unregister(
            State(state.clone()),
            Json(agents::UnregisterRequest {
                agent_identifier: "localhost:8002".to_string(),
            }),
        )
        .await
        .into_response(),
    )
    .await;

    assert_eq!(body["success"], true);
    assert_eq!(body["agent_name"], "weather_agent");
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn rpc_message_send_round_trips_through_tasks_get() {
    let agent_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"method": "message/send"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "role": "agent",
                "messageId": "m1",
                "parts": [{"kind": "text", "text": "calculation complete: 42"}]
            }
        })))
        .mount(&agent_server)
        .await;

    let state = test_state();
    state.registry.add(card(
        "calc_agent",
        &agent_server.uri(),
        "calculator",
        &["calculate", "math"],
        "adds and subtracts numbers",
    ));

    let send_req = sb_protocol::JsonRpcRequest::new(
        serde_json::json!(1),
        "message/send",
        serde_json::json!({
            "id": "outer-task-1",
            "message": {"parts": [{"type": "text", "text": "please calculate 6 times 7"}]}
        }),
    );
    let send_body = body_json(rpc::rpc(State(state.clone()), Json(send_req)).await.into_response()).await;
    assert!(send_body.get("error").is_none());
    let task_id = send_body["result"]["id"].as_str().unwrap().to_string();

    let get_req = sb_protocol::JsonRpcRequest::new(serde_json::json!(2), "tasks/get", serde_json::json!({"id": task_id}));
    let get_body = body_json(rpc::rpc(State(state.clone()), Json(get_req)).await.into_response()).await;
    assert_eq!(get_body["result"]["status"]["state"], "completed");
}
