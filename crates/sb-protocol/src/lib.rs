//! Wire types shared between the registry, routing, transport, and gateway
//! crates: agent descriptors, the derived routing indices, and the
//! JSON-RPC 2.0 envelope (including the downstream `Task` state machine).

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Agent Card
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A remote agent's self-description, fetched once at registration and
/// treated as immutable afterward. Unknown fields in the wire payload are
/// tolerated (`#[serde(default)]` on every optional field).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCard {
    /// Display name; also the registry key.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Base endpoint for JSON-RPC calls (no trailing slash).
    pub url: String,
    #[serde(default = "d_version")]
    pub version: String,
    #[serde(default)]
    pub capabilities: AgentCardCapabilities,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default, rename = "defaultInputModes")]
    pub default_input_modes: Vec<String>,
    #[serde(default, rename = "defaultOutputModes")]
    pub default_output_modes: Vec<String>,
}

fn d_version() -> String {
    "0.0.0".into()
}

impl AgentCard {
    /// Normalizes `url` by stripping a single trailing slash, matching the
    /// wire protocol's "no path suffix, trailing slashes stripped" rule.
    pub fn normalized_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// Streaming/push/state-history flags advertised by the card.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentCardCapabilities {
    #[serde(default)]
    pub streaming: bool,
    #[serde(default, rename = "pushNotifications")]
    pub push_notifications: bool,
    #[serde(default, rename = "stateTransitionHistory")]
    pub state_transition_history: bool,
}

/// A single capability on an agent card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Derived indices (recomputed on every registry mutation)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Aggregated routing surface over one card's skills.
#[derive(Debug, Clone, Default)]
pub struct AgentCapabilities {
    pub domains: HashSet<String>,
    pub keywords: HashSet<String>,
    pub examples: Vec<String>,
    pub skills_by_id: HashMap<String, SkillSummary>,
}

#[derive(Debug, Clone)]
pub struct SkillSummary {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// skill name -> ordered keyword list (tags ∪ underscore-tokenized name ∪
/// first three ≥3-char description tokens).
pub type SkillKeywords = HashMap<String, Vec<String>>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JSON-RPC 2.0 envelope
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: serde_json::Value,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    pub fn new(id: impl Into<serde_json::Value>, method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: serde_json::Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message / Part / Task
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single part of a message or artifact body. Only the `text` kind is
/// produced or consumed by this system; other kinds pass through opaquely
/// when encountered on the wire.
///
/// The wire tag field differs by context: `artifacts[*].parts` and
/// `status.message.parts` tag on `kind` (spec §4.5 "Response extraction"),
/// while a direct `message/send` Message response tags on `type` (the same
/// shape the orchestrator itself sends as a `message/send` request). `Part`
/// accepts either so both shapes parse through the one type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum Part {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

impl<'de> Deserialize<'de> for Part {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            kind: Option<String>,
            #[serde(default, rename = "type")]
            type_: Option<String>,
            #[serde(default)]
            text: Option<String>,
        }

        let raw = Raw::deserialize(deserializer)?;
        match raw.kind.as_deref().or(raw.type_.as_deref()) {
            Some("text") => Ok(Part::Text {
                text: raw.text.unwrap_or_default(),
            }),
            _ => Ok(Part::Other),
        }
    }
}

impl Part {
    pub fn text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text.as_str()),
            Part::Other => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    #[serde(rename = "messageId")]
    pub message_id: String,
    #[serde(default, rename = "contextId")]
    pub context_id: Option<String>,
    pub parts: Vec<Part>,
}

impl Message {
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::text).collect::<Vec<_>>().join("")
    }
}

/// Downstream task lifecycle state, as reported by `status.state` on the
/// wire. `pending` and `working` are non-terminal; the rest stop polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Pending,
    Working,
    InputRequired,
    Completed,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed | TaskState::InputRequired)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A downstream unit of work, one per forwarded query. Carries `id` (the
/// task identifier minted by the orchestrator or agent) and `context_id`
/// (the session id) for poll correlation, restoring the fields present in
/// the original payload construction but dropped from the distilled data
/// model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default, rename = "contextId")]
    pub context_id: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

impl Task {
    /// Concatenated text from every `text` part in every artifact, in
    /// order. Empty string if no artifacts carry text.
    pub fn artifact_text(&self) -> String {
        self.artifacts
            .iter()
            .flat_map(|a| a.parts.iter())
            .filter_map(Part::text)
            .collect::<Vec<_>>()
            .join("")
    }

    /// Text carried by `status.message`, used for `failed` and
    /// `input-required` terminal states.
    pub fn status_message_text(&self) -> String {
        self.status
            .message
            .as_ref()
            .map(Message::text)
            .unwrap_or_default()
    }
}

/// The result of a `message/send` call: either a `Task` envelope or a
/// direct `Message`, discriminated structurally (presence of `status` vs
/// `parts`) rather than by a wire-level type tag, matching the way the
/// reference implementation branches on these two shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SendResult {
    Task(Task),
    Message(Message),
}
