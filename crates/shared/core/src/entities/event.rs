use serde::{Deserialize, Serialize};

use super::{Direction, Metric, RegimeState, StateTransition};
use crate::values::{EntityId, Timestamp};

/// Per-tick output of a detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEvent {
    /// State after the tick
    pub state: RegimeState,
    pub timestamp: Timestamp,
    pub zscore: f64,
    pub reason: String,
    /// Present only when the tick changed the state
    pub transition: Option<StateTransition>,
}

impl StateEvent {
    pub fn has_transition(&self) -> bool {
        self.transition.is_some()
    }
}

/// A state change attributed to one (entity, metric) stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub entity_id: EntityId,
    pub metric: Metric,
    pub event: StateEvent,
}

impl DetectionEvent {
    /// Wrap a tick result, keeping it only if it carries a transition
    pub fn from_tick(entity_id: &str, metric: Metric, event: StateEvent) -> Option<Self> {
        event.transition.as_ref()?;
        Some(Self {
            entity_id: entity_id.to_string(),
            metric,
            event,
        })
    }

    pub fn transition(&self) -> Option<&StateTransition> {
        self.event.transition.as_ref()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.event.timestamp
    }

    /// Flatten into a single output record
    pub fn to_record(&self) -> EventRecord {
        let (from_state, direction, reason) = match &self.event.transition {
            Some(t) => (t.from_state, t.direction, t.reason.clone()),
            None => (self.event.state, Direction::None, self.event.reason.clone()),
        };

        EventRecord {
            entity_id: self.entity_id.clone(),
            metric: self.metric,
            timestamp: self.event.timestamp,
            from_state,
            to_state: self.event.state,
            direction,
            zscore: self.event.zscore,
            reason,
        }
    }
}

/// Flat, serializable view of a `DetectionEvent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub entity_id: EntityId,
    pub metric: Metric,
    pub timestamp: Timestamp,
    pub from_state: RegimeState,
    pub to_state: RegimeState,
    pub direction: Direction,
    pub zscore: f64,
    pub reason: String,
}
