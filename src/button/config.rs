use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SPINNER: &str = r#"<span class="btn-spinner" aria-hidden="true"></span>"#;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonConfig {
    pub loading_text: String,
    pub success_duration_ms: u64,
    pub error_duration_ms: u64,
    pub prevent_double_click: bool,
    /// Markup placed before the loading text
    pub spinner_template: String,
    /// Minimum gap between two accepted clicks
    pub debounce_ms: u64,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            loading_text: "Processing...".into(),
            success_duration_ms: 2000,
            error_duration_ms: 5000,
            prevent_double_click: true,
            spinner_template: DEFAULT_SPINNER.into(),
            debounce_ms: 500,
        }
    }
}

impl ButtonConfig {
    pub fn success_duration(&self) -> Duration {
        Duration::from_millis(self.success_duration_ms)
    }

    pub fn error_duration(&self) -> Duration {
        Duration::from_millis(self.error_duration_ms)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
