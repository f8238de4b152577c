//! Regime state machine
//!
//! ```text
//!            WATCHING              CONFIRMED
//!   NORMAL ───────────► UNSTABLE ───────────► SHIFTED
//!     ▲  ▲                 │                     │
//!     │  └─NOT_DEVIATING───┘                     │
//!     └──────────────NOT_DEVIATING───────────────┘
//! ```
//!
//! The desired state is a pure function of the persistence status; a
//! transition is recorded only when it differs from the current state.
//! There is no terminal state.

use blackice_core::{RegimeState, StateTransition, Timestamp};

use crate::persistence::{PersistenceResult, PersistenceStatus};

#[derive(Debug, Clone)]
pub struct RegimeStateMachine {
    metric_name: String,
    current_state: RegimeState,
    transitions: Vec<StateTransition>,
}

impl RegimeStateMachine {
    pub fn new(metric_name: impl Into<String>) -> Self {
        Self {
            metric_name: metric_name.into(),
            current_state: RegimeState::Normal,
            transitions: Vec::new(),
        }
    }

    /// State a persistence status maps to
    pub fn desired_state(status: PersistenceStatus) -> RegimeState {
        match status {
            PersistenceStatus::NotDeviating => RegimeState::Normal,
            PersistenceStatus::Watching => RegimeState::Unstable,
            PersistenceStatus::Confirmed => RegimeState::Shifted,
        }
    }

    /// Apply a persistence result; returns the transition if the state changed
    pub fn process(
        &mut self,
        persistence: &PersistenceResult,
        timestamp: Timestamp,
    ) -> Option<StateTransition> {
        let desired = Self::desired_state(persistence.status);
        if desired == self.current_state {
            return None;
        }

        let transition = StateTransition::new(
            self.current_state,
            desired,
            timestamp,
            persistence.direction,
            persistence.describe(),
        );

        log::debug!(
            "[{}] {} -> {} at {} ({})",
            self.metric_name,
            transition.from_state,
            transition.to_state,
            timestamp,
            transition.reason
        );

        self.current_state = desired;
        self.transitions.push(transition.clone());
        Some(transition)
    }

    #[inline]
    pub fn current_state(&self) -> RegimeState {
        self.current_state
    }

    /// Every transition recorded so far, oldest first
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }
}
