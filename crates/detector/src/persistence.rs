//! Persistence (hysteresis) filter
//!
//! Turns a stream of deviation results into a confirm/watch/clear status.
//! A streak must reach `required_count` same-direction significant points
//! before it is trusted, and a single non-significant point clears it
//! completely: no partial credit, no decay.

use blackice_core::{Direction, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::deviation::DeviationResult;
use crate::error::{ConfigError, Result};

/// Persistence rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub window_size: usize,
    pub min_consecutive_points: usize,
    pub min_fraction_of_window: f64,
}

impl PersistenceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(ConfigError::InvalidWindowSize);
        }
        if self.min_consecutive_points < 1 {
            return Err(ConfigError::InvalidMinConsecutive(self.min_consecutive_points));
        }
        if !(0.0..=1.0).contains(&self.min_fraction_of_window) {
            return Err(ConfigError::InvalidFraction(self.min_fraction_of_window));
        }
        Ok(())
    }

    /// `max(min_consecutive_points, ceil(min_fraction_of_window * window_size))`
    pub fn required_count(&self) -> usize {
        let by_fraction = (self.min_fraction_of_window * self.window_size as f64).ceil() as usize;
        self.min_consecutive_points.max(by_fraction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersistenceStatus {
    NotDeviating,
    Watching,
    Confirmed,
}

impl fmt::Display for PersistenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PersistenceStatus::NotDeviating => "NOT_DEVIATING",
            PersistenceStatus::Watching => "WATCHING",
            PersistenceStatus::Confirmed => "CONFIRMED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceResult {
    pub status: PersistenceStatus,
    pub direction: Direction,
    pub consecutive_count: usize,
    pub required_count: usize,
    pub deviation_start_ts: Option<Timestamp>,
    /// First tick of the current streak at which it was confirmed
    pub confirmation_ts: Option<Timestamp>,
    /// `min(1, consecutive_count / required_count)`
    pub progress_fraction: f64,
}

impl PersistenceResult {
    /// Diagnostic summary, e.g. `CONFIRMED HIGH: 3/3 consecutive deviations`
    pub fn describe(&self) -> String {
        match self.status {
            PersistenceStatus::NotDeviating => {
                format!("NOT_DEVIATING: 0/{} consecutive deviations", self.required_count)
            }
            status => format!(
                "{} {}: {}/{} consecutive deviations",
                status, self.direction, self.consecutive_count, self.required_count
            ),
        }
    }
}

/// Debounces deviation streaks
#[derive(Debug, Clone)]
pub struct PersistenceValidator {
    config: PersistenceConfig,
    required_count: usize,
    current_direction: Direction,
    consecutive_count: usize,
    deviation_start_ts: Option<Timestamp>,
    confirmation_ts: Option<Timestamp>,
}

impl PersistenceValidator {
    pub fn new(config: PersistenceConfig) -> Result<Self> {
        config.validate()?;
        let required_count = config.required_count();
        Ok(Self {
            config,
            required_count,
            current_direction: Direction::None,
            consecutive_count: 0,
            deviation_start_ts: None,
            confirmation_ts: None,
        })
    }

    pub fn check(&mut self, deviation: &DeviationResult) -> PersistenceResult {
        if !deviation.is_significant {
            self.clear();
            return PersistenceResult {
                status: PersistenceStatus::NotDeviating,
                direction: Direction::None,
                consecutive_count: 0,
                required_count: self.required_count,
                deviation_start_ts: None,
                confirmation_ts: None,
                progress_fraction: 0.0,
            };
        }

        if deviation.direction == self.current_direction {
            self.consecutive_count += 1;
        } else {
            self.current_direction = deviation.direction;
            self.consecutive_count = 1;
            self.deviation_start_ts = Some(deviation.timestamp);
        }

        let status = if self.consecutive_count >= self.required_count {
            PersistenceStatus::Confirmed
        } else {
            PersistenceStatus::Watching
        };
        if status == PersistenceStatus::Confirmed && self.confirmation_ts.is_none() {
            self.confirmation_ts = Some(deviation.timestamp);
        }

        PersistenceResult {
            status,
            direction: self.current_direction,
            consecutive_count: self.consecutive_count,
            required_count: self.required_count,
            deviation_start_ts: self.deviation_start_ts,
            confirmation_ts: self.confirmation_ts,
            progress_fraction: (self.consecutive_count as f64 / self.required_count as f64)
                .min(1.0),
        }
    }

    fn clear(&mut self) {
        self.current_direction = Direction::None;
        self.consecutive_count = 0;
        self.deviation_start_ts = None;
        self.confirmation_ts = None;
    }

    pub fn reset(&mut self) {
        self.clear();
    }

    #[inline]
    pub fn required_count(&self) -> usize {
        self.required_count
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }
}
