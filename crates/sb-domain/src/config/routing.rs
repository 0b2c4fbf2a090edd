use serde::{Deserialize, Serialize};

/// Per-signal weights used by the scoring engine and the confidence
/// threshold below which a request is declined rather than routed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "d_keyword_tag_weight")]
    pub keyword_tag_weight: f32,

    #[serde(default = "d_skill_match_weight")]
    pub skill_match_weight: f32,

    #[serde(default = "d_domain_token_weight")]
    pub domain_token_weight: f32,

    #[serde(default = "d_keyword_weight")]
    pub keyword_weight: f32,

    #[serde(default = "d_example_token_weight")]
    pub example_token_weight: f32,

    #[serde(default = "d_description_token_weight")]
    pub description_token_weight: f32,

    #[serde(default = "d_keyword_signal_weight")]
    pub keyword_signal_weight: f32,

    #[serde(default = "d_semantic_signal_weight")]
    pub semantic_signal_weight: f32,

    #[serde(default = "d_confidence_threshold")]
    pub confidence_threshold: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            keyword_tag_weight: d_keyword_tag_weight(),
            skill_match_weight: d_skill_match_weight(),
            domain_token_weight: d_domain_token_weight(),
            keyword_weight: d_keyword_weight(),
            example_token_weight: d_example_token_weight(),
            description_token_weight: d_description_token_weight(),
            keyword_signal_weight: d_keyword_signal_weight(),
            semantic_signal_weight: d_semantic_signal_weight(),
            confidence_threshold: d_confidence_threshold(),
        }
    }
}

fn d_keyword_tag_weight() -> f32 {
    1.0
}
fn d_skill_match_weight() -> f32 {
    1.5
}
fn d_domain_token_weight() -> f32 {
    0.5
}
fn d_keyword_weight() -> f32 {
    0.7
}
fn d_example_token_weight() -> f32 {
    0.3
}
fn d_description_token_weight() -> f32 {
    0.4
}
fn d_keyword_signal_weight() -> f32 {
    0.6
}
fn d_semantic_signal_weight() -> f32 {
    0.4
}
fn d_confidence_threshold() -> f32 {
    0.2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_orchestrator_weights() {
        let cfg = RoutingConfig::default();
        assert_eq!(cfg.keyword_tag_weight, 1.0);
        assert_eq!(cfg.skill_match_weight, 1.5);
        assert_eq!(cfg.domain_token_weight, 0.5);
        assert_eq!(cfg.keyword_weight, 0.7);
        assert_eq!(cfg.example_token_weight, 0.3);
        assert_eq!(cfg.description_token_weight, 0.4);
    }

    #[test]
    fn combiner_weights_sum_to_one() {
        let cfg = RoutingConfig::default();
        assert!((cfg.keyword_signal_weight + cfg.semantic_signal_weight - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn default_threshold_is_point_two() {
        assert_eq!(RoutingConfig::default().confidence_threshold, 0.2);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: RoutingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.confidence_threshold, 0.2);
    }

    #[test]
    fn deserialize_with_override() {
        let cfg: RoutingConfig = serde_json::from_str(r#"{"confidence_threshold":0.5}"#).unwrap();
        assert_eq!(cfg.confidence_threshold, 0.5);
        assert_eq!(cfg.skill_match_weight, 1.5);
    }
}
