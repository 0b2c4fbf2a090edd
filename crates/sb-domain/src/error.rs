/// Shared error type used across all Switchboard crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("config: {0}")]
    Config(String),

    #[error("agent registration failed: {0}")]
    Registration(String),

    #[error("no agent has sufficient capability to handle this request")]
    RoutingDeclined,

    #[error("transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    #[error("agent task failed: {0}")]
    AgentTaskFailed(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
