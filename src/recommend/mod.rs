pub mod config;
pub mod difficulty;
pub mod engine;
pub mod strategy;

pub use config::{RecommendationConfig, RemediationRule};
pub use difficulty::{adjust_difficulty, Difficulty};
pub use engine::{RecommendOptions, RecommendationEngine, StrategyScore};
pub use strategy::{
    builtin_strategies, strategy_fn, CognitiveNeeds, FieldMatch, ScoringContext, ScoringStrategy,
    Urgency, UserTags,
};
