mod direction;
mod event;
mod interval;
mod regime_state;
mod row;
mod transition;

pub use direction::Direction;
pub use event::{DetectionEvent, EventRecord, StateEvent};
pub use interval::AnomalyInterval;
pub use regime_state::RegimeState;
pub use row::{Metric, Row};
pub use transition::StateTransition;
