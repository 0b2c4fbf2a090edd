use crate::scorer::{default_scorers, ScoreCategory, Scorer, ScoringContext};
use sb_domain::config::RoutingConfig;
use sb_protocol::{AgentCapabilities, AgentCard, SkillKeywords};
use serde::Serialize;

/// Per-agent diagnostic scores, returned alongside the selection so the
/// facade can log or surface why an agent was (or wasn't) picked.
#[derive(Debug, Clone, Serialize)]
pub struct AgentDiagnostic {
    pub agent_name: String,
    pub keyword_score: f32,
    pub semantic_score: f32,
    pub combined_score: f32,
    pub matched_skills: Vec<String>,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    pub agent_id: Option<String>,
    pub confidence: f32,
    pub reasoning: String,
    pub diagnostics: Vec<AgentDiagnostic>,
}

pub struct RoutingEngine {
    scorers: Vec<Box<dyn Scorer + Send + Sync>>,
}

impl Default for RoutingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingEngine {
    pub fn new() -> Self {
        Self {
            scorers: default_scorers(),
        }
    }

    /// `registry` is an ordered snapshot of (card, capabilities) pairs;
    /// ties are broken by its iteration order, matching the registry's
    /// stable insertion order.
    pub fn select(
        &self,
        request: &str,
        registry: &[(AgentCard, AgentCapabilities)],
        skill_keywords: &SkillKeywords,
        config: &RoutingConfig,
    ) -> RoutingDecision {
        let request_lower = request.to_lowercase();
        let request_tokens: Vec<String> = request_lower
            .split_whitespace()
            .map(|s| s.to_string())
            .collect();

        let mut diagnostics = Vec::with_capacity(registry.len());
        let mut best: Option<usize> = None;

        for (card, capabilities) in registry {
            let ctx = ScoringContext {
                request_lower: &request_lower,
                request_tokens: &request_tokens,
                card,
                capabilities,
                skill_keywords,
                weights: config,
            };

            let mut keyword_score = 0.0f32;
            let mut semantic_score = 0.0f32;
            let mut matched_skills = Vec::new();
            let mut reasons = Vec::new();

            for scorer in &self.scorers {
                let output = scorer.score(&ctx);
                for c in &output.contributions {
                    match c.category {
                        ScoreCategory::Keyword => keyword_score += c.amount,
                        ScoreCategory::Semantic => semantic_score += c.amount,
                    }
                }
                matched_skills.extend(output.matched_skills);
                reasons.extend(output.reasons);
            }

            let combined_score =
                keyword_score * config.keyword_signal_weight + semantic_score * config.semantic_signal_weight;

            diagnostics.push(AgentDiagnostic {
                agent_name: card.name.clone(),
                keyword_score,
                semantic_score,
                combined_score,
                matched_skills,
                reasons,
            });

            let this_idx = diagnostics.len() - 1;
            let is_better = match best {
                None => true,
                Some(best_idx) => combined_score > diagnostics[best_idx].combined_score,
            };
            if is_better {
                best = Some(this_idx);
            }
        }

        let Some(best_idx) = best else {
            let decision = RoutingDecision {
                agent_id: None,
                confidence: 0.0,
                reasoning: "No agent has sufficient capability to handle this request.".into(),
                diagnostics,
            };
            emit_decision(request.len(), registry.len(), &decision);
            return decision;
        };

        let best_diag = &diagnostics[best_idx];
        if best_diag.combined_score < config.confidence_threshold {
            let decision = RoutingDecision {
                agent_id: None,
                confidence: 0.0,
                reasoning: "No agent has sufficient capability to handle this request.".into(),
                diagnostics,
            };
            emit_decision(request.len(), registry.len(), &decision);
            return decision;
        }

        let n = registry.len().max(1) as f32;
        let confidence = (best_diag.combined_score / n).min(1.0);
        let reasoning = build_reasoning(best_diag);

        let decision = RoutingDecision {
            agent_id: Some(best_diag.agent_name.clone()),
            confidence,
            reasoning,
            diagnostics,
        };
        emit_decision(request.len(), registry.len(), &decision);
        decision
    }
}

fn emit_decision(request_len: usize, candidate_count: usize, decision: &RoutingDecision) {
    sb_domain::trace::TraceEvent::RoutingDecision {
        request_len,
        candidate_count,
        selected_agent: decision.agent_id.clone(),
        confidence: decision.confidence,
        reasoning: decision.reasoning.clone(),
    }
    .emit();
}

fn build_reasoning(diag: &AgentDiagnostic) -> String {
    let mut parts = vec![format!("selected {}", diag.agent_name)];

    let keyword_reasons: Vec<&String> = diag
        .reasons
        .iter()
        .filter(|r| r.starts_with("matched keywords"))
        .collect();
    let skill_reasons: Vec<&String> = diag
        .reasons
        .iter()
        .filter(|r| r.starts_with("matched skills"))
        .collect();
    let semantic_reasons: Vec<&String> = diag
        .reasons
        .iter()
        .filter(|r| !r.starts_with("matched keywords") && !r.starts_with("matched skills"))
        .take(3)
        .collect();

    for r in keyword_reasons.iter().chain(skill_reasons.iter()).chain(semantic_reasons.iter()) {
        parts.push((*r).clone());
    }

    if parts.len() == 1 {
        parts.push("based on best overall capability match".into());
    }

    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_protocol::{AgentCardCapabilities, Skill};
    use std::collections::HashMap;

    fn weather_card() -> AgentCard {
        AgentCard {
            name: "weather_agent".into(),
            description: "provides weather forecasts".into(),
            url: "http://localhost:8001".into(),
            version: "1.0".into(),
            capabilities: AgentCardCapabilities::default(),
            skills: vec![Skill {
                id: "weather_skill".into(),
                name: "weather_skill".into(),
                description: "forecast temperature and climate conditions".into(),
                tags: vec!["weather".into(), "forecast".into()],
                examples: vec!["what is the weather today".into()],
            }],
            default_input_modes: vec![],
            default_output_modes: vec![],
        }
    }

    fn capabilities_for(card: &AgentCard) -> AgentCapabilities {
        let mut caps = AgentCapabilities::default();
        for skill in &card.skills {
            for tag in &skill.tags {
                caps.keywords.insert(tag.to_lowercase());
            }
            caps.domains.insert("weather".into());
            caps.examples.extend(skill.examples.iter().cloned());
        }
        caps
    }

    fn skill_keywords_for(card: &AgentCard) -> SkillKeywords {
        let mut map = HashMap::new();
        for skill in &card.skills {
            map.insert(skill.name.clone(), vec!["weather".into(), "forecast".into()]);
        }
        map
    }

    #[test]
    fn selects_matching_agent_above_threshold() {
        let card = weather_card();
        let caps = capabilities_for(&card);
        let keywords = skill_keywords_for(&card);
        let registry = vec![(card, caps)];
        let engine = RoutingEngine::new();
        let config = RoutingConfig::default();

        let decision = engine.select("what's the weather in Boston", &registry, &keywords, &config);
        assert_eq!(decision.agent_id.as_deref(), Some("weather_agent"));
        assert!(decision.confidence > 0.0);
    }

    #[test]
    fn declines_below_threshold() {
        let card = weather_card();
        let caps = capabilities_for(&card);
        let keywords = skill_keywords_for(&card);
        let registry = vec![(card, caps)];
        let engine = RoutingEngine::new();
        let config = RoutingConfig::default();

        let decision = engine.select("please compute 2 plus 2 for me", &registry, &keywords, &config);
        assert!(decision.agent_id.is_none());
        assert_eq!(decision.reasoning, "No agent has sufficient capability to handle this request.");
    }

    #[test]
    fn confidence_scales_with_pool_size() {
        let card = weather_card();
        let caps = capabilities_for(&card);
        let keywords = skill_keywords_for(&card);
        let engine = RoutingEngine::new();
        let config = RoutingConfig::default();

        let small_pool = vec![(card.clone(), caps.clone())];
        let mut large_pool = small_pool.clone();
        for i in 0..4 {
            let mut other = card.clone();
            other.name = format!("other_{i}");
            large_pool.push((other, AgentCapabilities::default()));
        }

        let d_small = engine.select("weather forecast please", &small_pool, &keywords, &config);
        let d_large = engine.select("weather forecast please", &large_pool, &keywords, &config);
        assert!(d_small.confidence >= d_large.confidence);
    }

    #[test]
    fn empty_registry_declines() {
        let engine = RoutingEngine::new();
        let config = RoutingConfig::default();
        let decision = engine.select("anything", &[], &HashMap::new(), &config);
        assert!(decision.agent_id.is_none());
    }
}
