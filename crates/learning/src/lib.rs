//! BlackIce Learning
//!
//! Offline search for detector parameters:
//!
//! ```text
//!  historical rows ──► heuristic_ground_truth ──► AnomalyInterval[]
//!        │                                              │
//!        ▼                                              ▼
//!  ParamGrid ──► candidate PipelineConfig ──► Pipeline ──► events ──► LossFunction
//!                                                                         │
//!                                         SearchOutcome (lowest loss) ◄───┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blackice_learning::{GridSearchOptimizer, ParamGrid, WeightedLoss, heuristic_ground_truth};
//!
//! let truth = heuristic_ground_truth(&rows, 95.0);
//! let optimizer = GridSearchOptimizer::new(ParamGrid::default(), WeightedLoss::default());
//! let outcome = optimizer.search(&rows, &truth)?;
//! outcome.best_config.to_file("configs/learned_config.json")?;
//! ```

pub mod labeler;
pub mod objective;
pub mod optimizer;

// Re-export main types
pub use labeler::{DEFAULT_CPU_THRESHOLD, heuristic_ground_truth};
pub use objective::{LossBreakdown, WeightedLoss};
pub use optimizer::{CandidateScore, GridSearchOptimizer, ParamGrid, SearchError, SearchOutcome};
