use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ContentItem, UserState};
use crate::recommend::config::RecommendationConfig;
use crate::recommend::strategy::{builtin_strategies, ScoringContext, ScoringStrategy};

// Set to false to silence per-strategy failure warnings
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

#[derive(Debug, Clone, Default)]
pub struct RecommendOptions {
    /// Accepted for the caller's bookkeeping; scoring ignores it.
    pub kind: Option<String>,
    pub limit: Option<usize>,
}

impl RecommendOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            kind: None,
            limit: Some(limit),
        }
    }
}

/// One strategy's contribution to an item, as reported by `explain`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyScore {
    pub name: String,
    pub score: f64,
}

struct ScoredEntry<'a> {
    item: &'a ContentItem,
    score: f64,
}

/// Ranks content items by summing the contributions of an ordered list of
/// scoring strategies.
pub struct RecommendationEngine {
    strategies: Vec<Box<dyn ScoringStrategy>>,
    default_limit: usize,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(&RecommendationConfig::default())
    }
}

impl RecommendationEngine {
    pub fn new(config: &RecommendationConfig) -> Self {
        Self {
            strategies: builtin_strategies(config),
            default_limit: config.default_limit,
        }
    }

    /// Engine with no strategies; every item scores zero until some are added.
    pub fn without_strategies(default_limit: usize) -> Self {
        Self {
            strategies: Vec::new(),
            default_limit,
        }
    }

    pub fn add_strategy<S>(&mut self, strategy: S)
    where
        S: ScoringStrategy + 'static,
    {
        self.strategies.push(Box::new(strategy));
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn recommend(
        &self,
        items: &[ContentItem],
        options: &RecommendOptions,
        user_state: &UserState,
    ) -> Vec<ContentItem> {
        self.recommend_at(items, options, user_state, Utc::now())
    }

    /// `recommend` against a fixed clock.
    pub fn recommend_at(
        &self,
        items: &[ContentItem],
        options: &RecommendOptions,
        user_state: &UserState,
        now: DateTime<Utc>,
    ) -> Vec<ContentItem> {
        let ctx = ScoringContext { user_state, now };
        let limit = options.limit.unwrap_or(self.default_limit);

        let mut scored: Vec<ScoredEntry<'_>> = items
            .iter()
            .map(|item| ScoredEntry {
                item,
                score: self.total_score(item, &ctx),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        log_debug!(
            "ranked {} items (type={:?}), returning up to {}",
            scored.len(),
            options.kind,
            limit
        );

        scored
            .into_iter()
            .take(limit)
            .map(|entry| entry.item.clone())
            .collect()
    }

    /// Per-strategy breakdown for a single item, in registration order.
    /// Failed strategies are reported as zero.
    pub fn explain(
        &self,
        item: &ContentItem,
        user_state: &UserState,
        now: DateTime<Utc>,
    ) -> Vec<StrategyScore> {
        let ctx = ScoringContext { user_state, now };
        self.strategies
            .iter()
            .map(|strategy| StrategyScore {
                name: strategy.name().to_string(),
                score: self.contribution(strategy.as_ref(), item, &ctx),
            })
            .collect()
    }

    fn total_score(&self, item: &ContentItem, ctx: &ScoringContext<'_>) -> f64 {
        self.strategies
            .iter()
            .map(|strategy| self.contribution(strategy.as_ref(), item, ctx))
            .sum()
    }

    fn contribution(
        &self,
        strategy: &dyn ScoringStrategy,
        item: &ContentItem,
        ctx: &ScoringContext<'_>,
    ) -> f64 {
        match strategy.score(item, ctx) {
            Ok(score) if score.is_finite() => score,
            Ok(score) => {
                log_warn!(
                    "strategy {} returned non-finite score {} for item {:?}",
                    strategy.name(),
                    score,
                    item.id
                );
                0.0
            }
            Err(err) => {
                log_warn!(
                    "strategy {} failed for item {:?}: {err:#}",
                    strategy.name(),
                    item.id
                );
                0.0
            }
        }
    }
}
