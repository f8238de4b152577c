//! Z-score deviation scoring with same-direction streak tracking

use blackice_core::{Direction, Timestamp};
use serde::{Deserialize, Serialize};

use crate::baseline::BaselineEstimator;
use crate::config::validate_threshold;
use crate::error::Result;

/// Outcome of scoring one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationResult {
    pub timestamp: Timestamp,
    pub value: f64,
    pub zscore: f64,
    /// |zscore|
    pub magnitude: f64,
    pub direction: Direction,
    /// Length of the current same-direction streak (0 when not significant)
    pub consecutive_count: usize,
    /// Timestamp the current streak began
    pub deviation_start_ts: Option<Timestamp>,
    pub is_significant: bool,
}

impl DeviationResult {
    /// A significant deviation, used when feeding a validator directly
    pub fn significant(
        timestamp: Timestamp,
        value: f64,
        zscore: f64,
        direction: Direction,
    ) -> Self {
        Self {
            timestamp,
            value,
            zscore,
            magnitude: zscore.abs(),
            direction,
            consecutive_count: 1,
            deviation_start_ts: Some(timestamp),
            is_significant: direction.is_deviating(),
        }
    }

    /// A sample inside the threshold band
    pub fn quiet(timestamp: Timestamp, value: f64, zscore: f64) -> Self {
        Self {
            timestamp,
            value,
            zscore,
            magnitude: zscore.abs(),
            direction: Direction::None,
            consecutive_count: 0,
            deviation_start_ts: None,
            is_significant: false,
        }
    }
}

/// Scores samples against a rolling baseline
///
/// The scorer owns its baseline and feeds every finite value into it after
/// scoring, including values it just flagged. A sustained shift is
/// therefore gradually absorbed into the baseline.
#[derive(Debug, Clone)]
pub struct DeviationScorer {
    baseline: BaselineEstimator,
    threshold: f64,
    last_direction: Direction,
    consecutive_count: usize,
    deviation_start_ts: Option<Timestamp>,
    rejected: u64,
}

impl DeviationScorer {
    pub fn new(baseline: BaselineEstimator, threshold: f64) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(Self {
            baseline,
            threshold,
            last_direction: Direction::None,
            consecutive_count: 0,
            deviation_start_ts: None,
            rejected: 0,
        })
    }

    /// Score `value`, update the streak, then absorb `value` into the baseline
    pub fn update(&mut self, value: f64, timestamp: Timestamp) -> DeviationResult {
        let zscore = self.zscore(value);
        let direction = Direction::classify(zscore, self.threshold);
        let is_significant = direction.is_deviating();

        if !is_significant {
            self.consecutive_count = 0;
            self.deviation_start_ts = None;
        } else if direction == self.last_direction {
            self.consecutive_count += 1;
        } else {
            self.consecutive_count = 1;
            self.deviation_start_ts = Some(timestamp);
        }
        self.last_direction = direction;

        if !self.baseline.update(value) {
            self.rejected += 1;
            log::warn!("Rejected non-finite sample {} at {}", value, timestamp);
        }

        DeviationResult {
            timestamp,
            value,
            zscore,
            magnitude: zscore.abs(),
            direction,
            consecutive_count: self.consecutive_count,
            deviation_start_ts: self.deviation_start_ts,
            is_significant,
        }
    }

    /// Z-score against the current baseline; 0 while cold, flat, or for non-finite input
    fn zscore(&self, value: f64) -> f64 {
        let std = self.baseline.std();
        if !self.baseline.is_ready() || std == 0.0 || !value.is_finite() {
            return 0.0;
        }
        (value - self.baseline.mean()) / std
    }

    /// Clear the streak, the baseline and the rejected-sample counter
    pub fn reset(&mut self) {
        self.baseline.reset();
        self.last_direction = Direction::None;
        self.consecutive_count = 0;
        self.deviation_start_ts = None;
        self.rejected = 0;
    }

    pub fn baseline(&self) -> &BaselineEstimator {
        &self.baseline
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn consecutive_count(&self) -> usize {
        self.consecutive_count
    }

    /// Samples the baseline refused (NaN/Inf)
    pub fn rejected_samples(&self) -> u64 {
        self.rejected
    }
}
