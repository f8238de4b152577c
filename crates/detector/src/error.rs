//! Detector configuration errors

use thiserror::Error;

/// Invalid detector parameters, raised at construction time only
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("window_size must be greater than 0")]
    InvalidWindowSize,

    #[error("zscore_threshold must be a finite value greater than 0, got {0}")]
    InvalidThreshold(f64),

    #[error("min_consecutive_points must be at least 1, got {0}")]
    InvalidMinConsecutive(usize),

    #[error("min_fraction_of_window must be within [0, 1], got {0}")]
    InvalidFraction(f64),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
