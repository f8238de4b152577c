//! Detector parameters

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::persistence::PersistenceConfig;

/// Parameters shared by every component of a detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Baseline window length, also the persistence observation window
    pub window_size: usize,
    /// |z| at or above which a sample is deviating
    pub zscore_threshold: f64,
    /// Minimum same-direction streak before a shift is confirmed
    pub min_consecutive_points: usize,
    /// Minimum streak as a fraction of `window_size`
    pub min_fraction_of_window: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_size: 60,
            zscore_threshold: 2.0,
            min_consecutive_points: 10,
            min_fraction_of_window: 0.2,
        }
    }
}

impl DetectorConfig {
    pub fn new(
        window_size: usize,
        zscore_threshold: f64,
        min_consecutive_points: usize,
        min_fraction_of_window: f64,
    ) -> Result<Self> {
        let config = Self {
            window_size,
            zscore_threshold,
            min_consecutive_points,
            min_fraction_of_window,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.zscore_threshold)?;
        self.persistence().validate()
    }

    /// Persistence rule over the same window as the baseline
    pub fn persistence(&self) -> PersistenceConfig {
        PersistenceConfig {
            window_size: self.window_size,
            min_consecutive_points: self.min_consecutive_points,
            min_fraction_of_window: self.min_fraction_of_window,
        }
    }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(ConfigError::InvalidThreshold(threshold));
    }
    Ok(())
}
