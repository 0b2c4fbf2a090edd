//! Routing Engine (C4): scores registered agents against a request and
//! selects the best-fit candidate above a confidence threshold.

mod engine;
mod scorer;

pub use engine::{AgentDiagnostic, RoutingDecision, RoutingEngine};
pub use scorer::{
    default_scorers, Contribution, DescriptionTokenScorer, DomainTokenScorer, ExampleTokenScorer,
    KeywordTagScorer, ScoreCategory, Scorer, ScoringContext, ScorerOutput, SkillNameScorer,
};
