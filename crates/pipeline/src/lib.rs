//! BlackIce Pipeline
//!
//! Applies the detection chain to every (entity, metric) pair found in a
//! stream of telemetry rows:
//!
//! ```text
//!  RowSource ──► chunk ──► Pipeline ──► route by (entity_id, metric)
//!                              │                 │
//!                              │        ┌────────┴────────┐
//!                              │        ▼                 ▼
//!                              │   DetectorUnit      DetectorUnit   (created lazily)
//!                              │        │                 │
//!                              │        └──► transitions ◄┘
//!                              ▼
//!                       MetricsComputer ──► systems / detection / stability
//! ```
//!
//! Rows for one entity must arrive in timestamp order. Distinct keys share
//! no state, which is what lets `Pipeline::process_parallel` partition the
//! work by entity.

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod source;

// Re-export main types
pub use config::PipelineConfig;
pub use error::ConfigFileError;
pub use metrics::{
    DetectionQuality, MetricsComputer, PipelineMetrics, StabilityMetrics, SystemsMetrics,
    VarianceShift, compute_variance_shift,
};
pub use pipeline::{DetectorKey, Pipeline};
pub use source::CsvRowSource;
