use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Read-only snapshot of what the page knows about the current user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    #[serde(default)]
    pub filters: Filters,
    #[serde(default)]
    pub user: UserProfile,
    /// Ability scores keyed by dimension (`memory`, `focus`, `speed`, ...).
    #[serde(default)]
    pub profile: HashMap<String, f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub tags: Vec<String>,
}

impl UserState {
    /// First interest field, if the user picked one. Empty strings count as unset.
    pub fn primary_field(&self) -> Option<&str> {
        self.filters
            .fields
            .first()
            .map(String::as_str)
            .filter(|field| !field.is_empty())
    }

    pub fn ability(&self, dimension: &str, fallback: f64) -> f64 {
        self.profile.get(dimension).copied().unwrap_or(fallback)
    }
}
