//! BlackIce Ports
//!
//! Port definitions (traits) for the BlackIce detection engine.
//! These define the boundaries between the engine and its collaborators:
//! where rows come from, and how emitted events are scored offline.

mod error;
mod scoring;
mod source;

pub use error::{SourceError, SourceResult};
pub use scoring::LossFunction;
pub use source::RowSource;
