mod bootstrap;
mod observability;
mod routing;
mod server;
mod sessions;
mod transport;

pub use bootstrap::*;
pub use observability::*;
pub use routing::*;
pub use server::*;
pub use sessions::*;
pub use transport::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.server.port == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.server.cors.allowed_origins.len() == 1 && self.server.cors.allowed_origins[0] == "*" {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "server.cors.allowed_origins".into(),
                message: "wildcard \"*\" allows any origin (fine for local use, not for production)".into(),
            });
        }

        if self.routing.confidence_threshold < 0.0 || self.routing.confidence_threshold > 1.0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "routing.confidence_threshold".into(),
                message: format!(
                    "confidence_threshold must be between 0.0 and 1.0 (got {})",
                    self.routing.confidence_threshold
                ),
            });
        }

        if (self.routing.keyword_signal_weight + self.routing.semantic_signal_weight - 1.0).abs() > 0.001 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "routing.keyword_signal_weight".into(),
                message: "keyword_signal_weight and semantic_signal_weight do not sum to 1.0".into(),
            });
        }

        if self.transport.poll_interval_secs == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "transport.poll_interval_secs".into(),
                message: "poll_interval_secs must be greater than 0".into(),
            });
        }

        if self.transport.poll_timeout_secs < self.transport.poll_interval_secs {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "transport.poll_timeout_secs".into(),
                message: "poll_timeout_secs must be at least poll_interval_secs".into(),
            });
        }

        if self.sessions.session_timeout_hours <= 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "sessions.session_timeout_hours".into(),
                message: "session_timeout_hours must be greater than 0".into(),
            });
        }

        for (i, url) in self.bootstrap.default_agents.iter().enumerate() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                issues.push(ConfigIssue {
                    severity: ConfigSeverity::Error,
                    field: format!("bootstrap.default_agents[{i}]"),
                    message: format!("agent base url must start with http:// or https:// (got \"{url}\")"),
                });
            }
        }

        if self.bootstrap.default_agents.is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "bootstrap.default_agents".into(),
                message: "no default agents configured; registry starts empty".into(),
            });
        }

        issues
    }
}
