use serde::{Deserialize, Serialize};

/// Agent base URLs fetched and registered once at process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub default_agents: Vec<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            default_agents: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_agents() {
        assert!(BootstrapConfig::default().default_agents.is_empty());
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: BootstrapConfig = serde_json::from_str("{}").unwrap();
        assert!(cfg.default_agents.is_empty());
    }

    #[test]
    fn deserialize_with_agents() {
        let cfg: BootstrapConfig =
            serde_json::from_str(r#"{"default_agents":["http://localhost:9001"]}"#).unwrap();
        assert_eq!(cfg.default_agents, vec!["http://localhost:9001".to_string()]);
    }
}
