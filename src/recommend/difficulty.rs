use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Pick the next game difficulty from a 0-100 performance score.
/// Both boundaries (40 and 80) stay in the medium band.
pub fn adjust_difficulty(performance: f64) -> Difficulty {
    if performance > 80.0 {
        Difficulty::Hard
    } else if performance < 40.0 {
        Difficulty::Easy
    } else {
        Difficulty::Medium
    }
}
