use serde::{Deserialize, Serialize};

/// Weights and thresholds for the built-in scoring strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationConfig {
    /// Result size when the caller doesn't pass a limit
    pub default_limit: usize,

    /// Awarded when any item tag contains the user's first interest field
    pub field_match_points: f64,

    /// Deadline urgency: awarded when the deadline is in (0, window) days
    pub urgency_points: f64,
    pub urgency_window_days: f64,

    /// Awarded once per user tag found in the item's tag set
    pub user_tag_points: f64,

    /// Cognitive remediation for game items
    pub remediation_points: f64,
    pub remediation_threshold: f64,
    pub default_ability: f64,
    pub remediation_table: Vec<RemediationRule>,
}

/// Maps a game item id to the profile dimension it trains.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemediationRule {
    pub item_id: String,
    pub dimension: String,
}

impl RemediationRule {
    pub fn new(item_id: impl Into<String>, dimension: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            dimension: dimension.into(),
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            field_match_points: 10.0,
            urgency_points: 5.0,
            urgency_window_days: 30.0,
            user_tag_points: 2.0,
            remediation_points: 15.0,
            remediation_threshold: 60.0,
            default_ability: 50.0,
            remediation_table: vec![
                RemediationRule::new("dual-n-back", "memory"),
                RemediationRule::new("stroop", "focus"),
                RemediationRule::new("speed-match", "speed"),
            ],
        }
    }
}
