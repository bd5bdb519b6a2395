use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::{ContentItem, UserState};
use crate::recommend::config::RecommendationConfig;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Everything a strategy may read while scoring one item.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub user_state: &'a UserState,
    pub now: DateTime<Utc>,
}

/// A named, additive contribution to an item's rank.
///
/// Strategies must not mutate shared state; the engine may call them from
/// several threads. An `Err` is logged by the engine and counted as zero.
pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, item: &ContentItem, ctx: &ScoringContext<'_>) -> Result<f64>;
}

/// Items whose tags mention the user's first interest field.
#[derive(Debug, Clone)]
pub struct FieldMatch {
    points: f64,
}

impl FieldMatch {
    pub fn new(points: f64) -> Self {
        Self { points }
    }
}

impl ScoringStrategy for FieldMatch {
    fn name(&self) -> &str {
        "fieldMatch"
    }

    fn score(&self, item: &ContentItem, ctx: &ScoringContext<'_>) -> Result<f64> {
        let Some(field) = ctx.user_state.primary_field() else {
            return Ok(0.0);
        };
        let field = field.to_lowercase();

        // Substring match so "computer" hits "computer science".
        let matched = item.tag_set().iter().any(|tag| tag.contains(&field));
        Ok(if matched { self.points } else { 0.0 })
    }
}

/// Deadlines closing within the window.
#[derive(Debug, Clone)]
pub struct Urgency {
    points: f64,
    window_days: f64,
}

impl Urgency {
    pub fn new(points: f64, window_days: f64) -> Self {
        Self {
            points,
            window_days,
        }
    }
}

impl ScoringStrategy for Urgency {
    fn name(&self) -> &str {
        "urgency"
    }

    fn score(&self, item: &ContentItem, ctx: &ScoringContext<'_>) -> Result<f64> {
        let Some(deadline) = item.deadline else {
            return Ok(0.0);
        };

        let days_left = (deadline - ctx.now).num_milliseconds() as f64 / MILLIS_PER_DAY;
        if days_left > 0.0 && days_left < self.window_days {
            Ok(self.points)
        } else {
            Ok(0.0)
        }
    }
}

/// Exact matches between the user's own tags and the item's tags.
#[derive(Debug, Clone)]
pub struct UserTags {
    points_per_match: f64,
}

impl UserTags {
    pub fn new(points_per_match: f64) -> Self {
        Self { points_per_match }
    }
}

impl ScoringStrategy for UserTags {
    fn name(&self) -> &str {
        "userTags"
    }

    fn score(&self, item: &ContentItem, ctx: &ScoringContext<'_>) -> Result<f64> {
        let user_tags = &ctx.user_state.user.tags;
        if user_tags.is_empty() {
            return Ok(0.0);
        }

        let item_tags = item.tag_set();
        let matches = user_tags
            .iter()
            .filter(|tag| item_tags.contains(&tag.to_lowercase()))
            .count();

        Ok(matches as f64 * self.points_per_match)
    }
}

/// Boosts training games for ability dimensions the user is weak in.
#[derive(Debug, Clone)]
pub struct CognitiveNeeds {
    points: f64,
    threshold: f64,
    default_ability: f64,
    // item id -> profile dimension
    table: HashMap<String, String>,
}

impl CognitiveNeeds {
    pub fn new(config: &RecommendationConfig) -> Self {
        let table = config
            .remediation_table
            .iter()
            .map(|rule| (rule.item_id.clone(), rule.dimension.clone()))
            .collect();

        Self {
            points: config.remediation_points,
            threshold: config.remediation_threshold,
            default_ability: config.default_ability,
            table,
        }
    }
}

impl ScoringStrategy for CognitiveNeeds {
    fn name(&self) -> &str {
        "cognitiveNeeds"
    }

    fn score(&self, item: &ContentItem, ctx: &ScoringContext<'_>) -> Result<f64> {
        if !item.is_kind("game") {
            return Ok(0.0);
        }

        let dimension = item.id.as_deref().and_then(|id| self.table.get(id));
        let Some(dimension) = dimension else {
            return Ok(0.0);
        };

        let ability = ctx.user_state.ability(dimension, self.default_ability);
        Ok(if ability < self.threshold { self.points } else { 0.0 })
    }
}

/// The four strategies every engine starts with, in scoring order.
pub fn builtin_strategies(config: &RecommendationConfig) -> Vec<Box<dyn ScoringStrategy>> {
    vec![
        Box::new(FieldMatch::new(config.field_match_points)),
        Box::new(Urgency::new(config.urgency_points, config.urgency_window_days)),
        Box::new(UserTags::new(config.user_tag_points)),
        Box::new(CognitiveNeeds::new(config)),
    ]
}

struct FnStrategy<F> {
    name: String,
    score: F,
}

impl<F> ScoringStrategy for FnStrategy<F>
where
    F: Fn(&ContentItem, &ScoringContext<'_>) -> Result<f64> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, item: &ContentItem, ctx: &ScoringContext<'_>) -> Result<f64> {
        (self.score)(item, ctx)
    }
}

/// Wrap a closure as a strategy for `RecommendationEngine::add_strategy`.
pub fn strategy_fn<F>(name: impl Into<String>, score: F) -> impl ScoringStrategy
where
    F: Fn(&ContentItem, &ScoringContext<'_>) -> Result<f64> + Send + Sync,
{
    FnStrategy {
        name: name.into(),
        score,
    }
}
