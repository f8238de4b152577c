use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the baseline a deviation falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Within the threshold band
    #[default]
    None,
    /// At or above `+threshold` standard deviations
    High,
    /// At or below `-threshold` standard deviations
    Low,
}

impl Direction {
    /// Classify a z-score against a symmetric threshold
    pub fn classify(zscore: f64, threshold: f64) -> Self {
        if zscore >= threshold {
            Direction::High
        } else if zscore <= -threshold {
            Direction::Low
        } else {
            Direction::None
        }
    }

    /// Returns true for `High` and `Low`
    pub fn is_deviating(&self) -> bool {
        !matches!(self, Direction::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::None => "NONE",
            Direction::High => "HIGH",
            Direction::Low => "LOW",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
