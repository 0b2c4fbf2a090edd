use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Exact origins or wildcard-port patterns (`http://localhost:*`) that
    /// are allowed to call the gateway. `["*"]` permits any origin.
    #[serde(default = "d_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: d_allowed_origins(),
        }
    }
}

fn d_allowed_origins() -> Vec<String> {
    vec!["*".into()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_host")]
    pub host: String,

    #[serde(default = "d_port")]
    pub port: u16,

    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: d_host(),
            port: d_port(),
            cors: CorsConfig::default(),
        }
    }
}

fn d_host() -> String {
    "localhost".into()
}

fn d_port() -> u16 {
    8000
}
