use serde::{Deserialize, Serialize};

/// Controls how the gateway process initializes its `tracing` subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "d_format")]
    pub log_format: String,

    #[serde(default = "d_level")]
    pub level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: d_format(),
            level: d_level(),
        }
    }
}

fn d_format() -> String {
    "json".into()
}

fn d_level() -> String {
    "info,sb_gateway=debug".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_json() {
        assert_eq!(ObservabilityConfig::default().log_format, "json");
    }

    #[test]
    fn default_level() {
        assert_eq!(ObservabilityConfig::default().level, "info,sb_gateway=debug");
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: ObservabilityConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.log_format, "json");
        assert_eq!(cfg.level, "info,sb_gateway=debug");
    }

    #[test]
    fn deserialize_with_overrides() {
        let cfg: ObservabilityConfig =
            serde_json::from_str(r#"{"log_format":"pretty","level":"debug"}"#).unwrap();
        assert_eq!(cfg.log_format, "pretty");
        assert_eq!(cfg.level, "debug");
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = ObservabilityConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ObservabilityConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.log_format, cfg.log_format);
        assert_eq!(back.level, cfg.level);
    }
}
