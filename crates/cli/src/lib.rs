//! BlackIce command line
//!
//! Argument parsing and the run loops behind the two binaries:
//! - `blackice`: stream a telemetry CSV through the pipeline and emit
//!   regime transitions
//! - `blackice-train`: label historical data and grid-search detector
//!   parameters
//!
//! The binaries only initialise logging and print the outcome, so both
//! flows can be driven from tests.

pub mod detect;
pub mod train;

pub use detect::{DetectArgs, DetectSummary, RunReport};
pub use train::{TrainArgs, TrainSummary};

/// `info` unless `RUST_LOG` says otherwise
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
