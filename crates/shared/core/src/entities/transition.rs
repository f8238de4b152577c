use serde::{Deserialize, Serialize};

use super::{Direction, RegimeState};
use crate::values::Timestamp;

/// A change of regime recorded by a state machine
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from_state: RegimeState,
    pub to_state: RegimeState,
    pub timestamp: Timestamp,
    /// Direction of the deviation driving the change (`None` when clearing)
    pub direction: Direction,
    /// Human readable diagnostic
    pub reason: String,
}

impl StateTransition {
    pub fn new(
        from_state: RegimeState,
        to_state: RegimeState,
        timestamp: Timestamp,
        direction: Direction,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            from_state,
            to_state,
            timestamp,
            direction,
            reason: reason.into(),
        }
    }

    /// Entering `Shifted` from any other state
    pub fn is_confirmation(&self) -> bool {
        self.to_state == RegimeState::Shifted
    }

    /// Returning to `Normal` from any other state
    pub fn is_recovery(&self) -> bool {
        self.to_state == RegimeState::Normal
    }
}
