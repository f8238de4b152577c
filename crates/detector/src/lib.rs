//! BlackIce Detector
//!
//! Online regime-shift detection for a single (entity, metric) stream.
//!
//! ## Architecture
//!
//! ```text
//!  value ──► DeviationScorer ──► PersistenceValidator ──► RegimeStateMachine ──► StateEvent
//!                 │    ▲                (hysteresis)          NORMAL
//!          z-score│    │ absorbs                               UNSTABLE
//!                 ▼    │ every value                           SHIFTED
//!           BaselineEstimator
//!                 │
//!           RollingWindow (FIFO, capacity = window_size)
//! ```
//!
//! Every component is synchronous and deterministic: identical input
//! sequences produce bit-identical output. Memory per detector is
//! O(window_size) regardless of stream length.

pub mod baseline;
pub mod config;
pub mod detector;
pub mod deviation;
pub mod error;
pub mod persistence;
pub mod state;
pub mod unit;
pub mod window;

// Re-export main types
pub use baseline::{BaselineEstimator, BaselineSnapshot};
pub use config::DetectorConfig;
pub use detector::RegimeDetector;
pub use deviation::{DeviationResult, DeviationScorer};
pub use error::{ConfigError, Result};
pub use persistence::{PersistenceConfig, PersistenceResult, PersistenceStatus, PersistenceValidator};
pub use state::RegimeStateMachine;
pub use unit::DetectorUnit;
pub use window::RollingWindow;
