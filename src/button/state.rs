use serde::{Deserialize, Serialize};

use super::control::Control;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ButtonState {
    Idle,
    Loading,
    Success,
    Error,
    /// Reserved. No transition enters this state.
    Disabled,
}

impl Default for ButtonState {
    fn default() -> Self {
        ButtonState::Idle
    }
}

/// Every class a transition may add. `restore` strips all of them.
pub const STATE_CLASSES: [&str; 3] = ["loading", "success", "error"];

impl ButtonState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonState::Idle => "idle",
            ButtonState::Loading => "loading",
            ButtonState::Success => "success",
            ButtonState::Error => "error",
            ButtonState::Disabled => "disabled",
        }
    }

    pub fn visual_class(&self) -> Option<&'static str> {
        match self {
            ButtonState::Loading => Some("loading"),
            ButtonState::Success => Some("success"),
            ButtonState::Error => Some("error"),
            ButtonState::Idle | ButtonState::Disabled => None,
        }
    }
}

/// What the control looked like before the lifecycle first touched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalSnapshot {
    pub content: String,
    pub disabled: bool,
    pub aria_label: Option<String>,
}

impl OriginalSnapshot {
    pub fn capture(control: &dyn Control) -> Self {
        Self {
            content: control.content(),
            disabled: control.is_disabled(),
            aria_label: control.aria_label(),
        }
    }

    /// Put content, disabled flag and label back. A label that didn't exist
    /// originally is removed rather than blanked.
    pub fn apply(&self, control: &dyn Control) {
        control.set_content(&self.content);
        control.set_disabled(self.disabled);
        control.set_aria_label(self.aria_label.as_deref());
    }
}
