use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sb_context::ContextManager;
use sb_domain::Config;
use sb_protocol::Task;
use sb_registry::{AgentCardClient, AgentRegistry};
use sb_routing::RoutingEngine;
use sb_transport::TaskTransport;

/// Shared application state passed to all API handlers.
///
/// Fields are grouped by concern:
/// - **Core services** — config
/// - **Registry & discovery** — agent registry, agent card client
/// - **Routing & transport** — routing engine, task transport
/// - **Session management** — context manager
#[derive(Clone)]
pub struct AppState {
    // ── Core services ────────────────────────────────────────────────
    pub config: Arc<Config>,

    // ── Registry & discovery ────────────────────────────────────────
    pub registry: Arc<AgentRegistry>,
    pub card_client: Arc<AgentCardClient>,

    // ── Routing & transport ─────────────────────────────────────────
    pub router: Arc<RoutingEngine>,
    pub transport: Arc<TaskTransport>,

    // ── Session management ───────────────────────────────────────────
    pub context: Arc<ContextManager>,

    /// Tasks manufactured synchronously by the inbound JSON-RPC surface
    /// (`api::rpc`), kept around so a follow-up `tasks/get` can retrieve
    /// the terminal result of a `message/send` it already completed.
    pub rpc_tasks: Arc<Mutex<HashMap<String, Task>>>,
}
