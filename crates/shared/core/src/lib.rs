//! BlackIce Core Domain
//!
//! Pure domain types shared by the detection engine and its collaborators.
//! This crate contains no I/O and no mutable global state.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    AnomalyInterval, DetectionEvent, Direction, EventRecord, Metric, RegimeState, Row, StateEvent,
    StateTransition,
};
pub use values::{EntityId, Timestamp, seconds_between};
