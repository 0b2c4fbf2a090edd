use sb_domain::config::RoutingConfig;
use sb_protocol::{AgentCapabilities, AgentCard, SkillKeywords};

/// Which half of the combined score a contribution feeds. The facade
/// combines keyword-category contributions at 0.6 and semantic-category
/// contributions at 0.4, per the weight table in `RoutingConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreCategory {
    Keyword,
    Semantic,
}

/// A single weighted contribution produced by a scorer.
#[derive(Debug, Clone)]
pub struct Contribution {
    pub category: ScoreCategory,
    pub amount: f32,
}

/// Everything a scorer needs to judge one candidate agent against one
/// lowercased request.
pub struct ScoringContext<'a> {
    pub request_lower: &'a str,
    pub request_tokens: &'a [String],
    pub card: &'a AgentCard,
    pub capabilities: &'a AgentCapabilities,
    pub skill_keywords: &'a SkillKeywords,
    pub weights: &'a RoutingConfig,
}

/// Output of scoring one candidate against one signal.
#[derive(Debug, Clone, Default)]
pub struct ScorerOutput {
    pub contributions: Vec<Contribution>,
    pub matched_skills: Vec<String>,
    pub reasons: Vec<String>,
}

impl ScorerOutput {
    fn push(&mut self, category: ScoreCategory, amount: f32) {
        self.contributions.push(Contribution { category, amount });
    }
}

/// A single weighted routing signal. The router holds one instance of
/// each variant and sums their contributions; this keeps the weight table
/// in one place instead of scattering ad hoc tag/keyword/description
/// matching across the selection logic.
pub trait Scorer {
    fn score(&self, ctx: &ScoringContext) -> ScorerOutput;
}

/// Tag substring match, and its reuse as the agent's aggregated keyword
/// set (`AgentCapabilities.keywords`, itself the union of lowercased
/// skill tags) checked at a lower, semantic-category weight.
pub struct KeywordTagScorer;

impl Scorer for KeywordTagScorer {
    fn score(&self, ctx: &ScoringContext) -> ScorerOutput {
        let mut out = ScorerOutput::default();
        let mut matched_tags = Vec::new();

        for skill in &ctx.card.skills {
            for tag in &skill.tags {
                let lower = tag.to_lowercase();
                if ctx.request_lower.contains(&lower) {
                    out.push(ScoreCategory::Keyword, ctx.weights.keyword_tag_weight);
                    matched_tags.push(lower);
                }
            }
        }

        for keyword in &ctx.capabilities.keywords {
            if ctx.request_lower.contains(keyword.as_str()) {
                out.push(ScoreCategory::Semantic, ctx.weights.keyword_weight);
            }
        }

        if !matched_tags.is_empty() {
            out.reasons.push(format!("matched keywords: {}", matched_tags.join(", ")));
        }
        out
    }
}

/// Skill-level match: any entry in `SkillKeywords[skill.name]` appears as
/// a substring of the request.
pub struct SkillNameScorer;

impl Scorer for SkillNameScorer {
    fn score(&self, ctx: &ScoringContext) -> ScorerOutput {
        let mut out = ScorerOutput::default();
        for skill in &ctx.card.skills {
            let Some(keywords) = ctx.skill_keywords.get(&skill.name) else {
                continue;
            };
            if keywords.iter().any(|k| ctx.request_lower.contains(k.as_str())) {
                out.push(ScoreCategory::Keyword, ctx.weights.skill_match_weight);
                out.matched_skills.push(skill.name.clone());
            }
        }
        if !out.matched_skills.is_empty() {
            out.reasons
                .push(format!("matched skills: {}", out.matched_skills.join(", ")));
        }
        out
    }
}

/// `AgentCapabilities.domains` token match.
pub struct DomainTokenScorer;

impl Scorer for DomainTokenScorer {
    fn score(&self, ctx: &ScoringContext) -> ScorerOutput {
        let mut out = ScorerOutput::default();
        let mut matched = Vec::new();
        for domain in &ctx.capabilities.domains {
            if ctx.request_lower.contains(domain.as_str()) {
                out.push(ScoreCategory::Semantic, ctx.weights.domain_token_weight);
                matched.push(domain.clone());
            }
        }
        if !matched.is_empty() {
            out.reasons.push(format!("domain match: {}", matched.join(", ")));
        }
        out
    }
}

/// Example text sharing any whitespace-split token with the request.
pub struct ExampleTokenScorer;

impl Scorer for ExampleTokenScorer {
    fn score(&self, ctx: &ScoringContext) -> ScorerOutput {
        let mut out = ScorerOutput::default();
        let mut hits = 0;
        for example in &ctx.capabilities.examples {
            let lower = example.to_lowercase();
            let shares_token = lower
                .split_whitespace()
                .any(|t| ctx.request_tokens.iter().any(|rt| rt == t));
            if shares_token {
                out.push(ScoreCategory::Semantic, ctx.weights.example_token_weight);
                hits += 1;
            }
        }
        if hits > 0 {
            out.reasons.push(format!("{hits} example(s) overlap with request"));
        }
        out
    }
}

/// Skill description tokens (>3 chars) found in the request, counted per
/// matching token per skill.
pub struct DescriptionTokenScorer;

impl Scorer for DescriptionTokenScorer {
    fn score(&self, ctx: &ScoringContext) -> ScorerOutput {
        let mut out = ScorerOutput::default();
        let mut total_matches = 0;
        for skill in &ctx.card.skills {
            let desc_lower = skill.description.to_lowercase();
            for token in ctx.request_tokens.iter().filter(|t| t.len() > 3) {
                if desc_lower.contains(token.as_str()) {
                    out.push(ScoreCategory::Semantic, ctx.weights.description_token_weight);
                    total_matches += 1;
                }
            }
        }
        if total_matches > 0 {
            out.reasons
                .push(format!("description token overlap ({total_matches})"));
        }
        out
    }
}

/// The fixed scorer pipeline the router iterates over.
pub fn default_scorers() -> Vec<Box<dyn Scorer + Send + Sync>> {
    vec![
        Box::new(KeywordTagScorer),
        Box::new(SkillNameScorer),
        Box::new(DomainTokenScorer),
        Box::new(ExampleTokenScorer),
        Box::new(DescriptionTokenScorer),
    ]
}
