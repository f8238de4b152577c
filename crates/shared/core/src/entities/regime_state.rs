use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative operating mode of a monitored metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegimeState {
    /// No sustained deviation (initial state)
    #[default]
    Normal,
    /// Deviation observed but not yet persistent
    Unstable,
    /// Deviation persisted long enough to be trusted
    Shifted,
}

impl RegimeState {
    /// Returns true for any state other than `Normal`
    pub fn is_anomalous(&self) -> bool {
        !matches!(self, RegimeState::Normal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegimeState::Normal => "NORMAL",
            RegimeState::Unstable => "UNSTABLE",
            RegimeState::Shifted => "SHIFTED",
        }
    }
}

impl fmt::Display for RegimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
