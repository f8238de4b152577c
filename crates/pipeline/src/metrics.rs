//! Detection quality, regime stability and throughput metrics
//!
//! Transition-based metrics expect each slice to be one stream's
//! transitions in order (as recorded by its state machine). Use the
//! `*_over_streams` variants to aggregate several streams.

use blackice_core::{Direction, RegimeState, StateTransition, Timestamp, seconds_between};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Variance ratios divide by at least this much
const VARIANCE_FLOOR: f64 = 1e-12;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionQuality {
    pub total_transitions: usize,
    /// Transitions into UNSTABLE
    pub unstable_entries: usize,
    /// Transitions into SHIFTED
    pub confirmed_shifts: usize,
    pub high_shifts: usize,
    pub low_shifts: usize,
    /// SHIFTED -> NORMAL
    pub recoveries: usize,
    /// UNSTABLE -> NORMAL, i.e. deviations the persistence filter discarded
    pub suppressed_watches: usize,
    /// Mean time from entering UNSTABLE to confirmation
    pub mean_confirmation_delay_seconds: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityMetrics {
    /// Entries into any non-NORMAL state
    pub total_regimes: usize,
    pub shifted_regimes: usize,
    /// Excursions away from NORMAL that have returned to NORMAL
    pub completed_regimes: usize,
    pub mean_regime_duration_seconds: Option<f64>,
    pub transitions_per_hour: f64,
    pub total_duration_seconds: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemsMetrics {
    pub rows_processed: u64,
    pub chunks_processed: u64,
    /// Non-finite samples refused by baselines
    pub rejected_samples: u64,
    /// Live detector units
    pub detectors: usize,
    /// Sum of recorded chunk durations
    pub processing_seconds: f64,
    /// Time between `start_processing` and `stop`
    pub wall_clock_seconds: f64,
    /// Rows over wall clock once stopped, over chunk time before that
    pub rows_per_second: f64,
}

/// Snapshot returned by `Pipeline::get_all_metrics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetrics {
    pub systems: SystemsMetrics,
    pub detection: DetectionQuality,
    pub stability: StabilityMetrics,
}

/// Change in level and spread between two sample sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceShift {
    pub pre_mean: f64,
    pub post_mean: f64,
    pub mean_shift: f64,
    pub pre_variance: f64,
    pub post_variance: f64,
    /// `post_variance / max(pre_variance, 1e-12)`
    pub ratio: f64,
}

/// Throughput accounting plus transition summaries
#[derive(Debug, Clone, Default)]
pub struct MetricsComputer {
    rows_processed: u64,
    chunks_processed: u64,
    processing_seconds: f64,
    started_at: Option<Instant>,
    wall_clock_seconds: Option<f64>,
}

impl MetricsComputer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the wall clock
    pub fn start_processing(&mut self) {
        self.started_at = Some(Instant::now());
        self.wall_clock_seconds = None;
    }

    pub fn record_chunk(&mut self, row_count: usize, duration_seconds: f64) {
        self.rows_processed += row_count as u64;
        self.chunks_processed += 1;
        self.processing_seconds += duration_seconds.max(0.0);
    }

    /// Freeze the wall clock; from here on throughput is measured against it
    pub fn stop(&mut self) {
        if let Some(started) = self.started_at {
            self.wall_clock_seconds = Some(started.elapsed().as_secs_f64());
        }
    }

    pub fn compute_systems_metrics(&self) -> SystemsMetrics {
        let wall_clock_seconds = match (self.wall_clock_seconds, self.started_at) {
            (Some(frozen), _) => frozen,
            (None, Some(started)) => started.elapsed().as_secs_f64(),
            (None, None) => 0.0,
        };
        // Frozen wall clock once stopped, accumulated chunk time while running
        let elapsed = match self.wall_clock_seconds {
            Some(frozen) if frozen > 0.0 => frozen,
            _ => self.processing_seconds,
        };
        let rows_per_second = if elapsed > 0.0 {
            self.rows_processed as f64 / elapsed
        } else {
            0.0
        };

        SystemsMetrics {
            rows_processed: self.rows_processed,
            chunks_processed: self.chunks_processed,
            rejected_samples: 0,
            detectors: 0,
            processing_seconds: self.processing_seconds,
            wall_clock_seconds,
            rows_per_second,
        }
    }

    pub fn compute_detection_quality(&self, transitions: &[StateTransition]) -> DetectionQuality {
        self.detection_over_streams(std::iter::once(transitions))
    }

    pub fn detection_over_streams<'a, I>(&self, streams: I) -> DetectionQuality
    where
        I: IntoIterator<Item = &'a [StateTransition]>,
    {
        let mut quality = DetectionQuality::default();
        let mut delay_total = 0.0;
        let mut delay_count = 0usize;

        for stream in streams {
            let mut watch_started: Option<Timestamp> = None;

            for t in stream {
                quality.total_transitions += 1;
                match (t.from_state, t.to_state) {
                    (_, RegimeState::Unstable) => {
                        quality.unstable_entries += 1;
                        watch_started = Some(t.timestamp);
                    }
                    (from, RegimeState::Shifted) => {
                        quality.confirmed_shifts += 1;
                        match t.direction {
                            Direction::High => quality.high_shifts += 1,
                            Direction::Low => quality.low_shifts += 1,
                            Direction::None => {}
                        }
                        let started = match from {
                            RegimeState::Normal => Some(t.timestamp),
                            _ => watch_started,
                        };
                        if let Some(start) = started {
                            delay_total += seconds_between(start, t.timestamp);
                            delay_count += 1;
                        }
                        watch_started = None;
                    }
                    (from, RegimeState::Normal) => {
                        match from {
                            RegimeState::Shifted => quality.recoveries += 1,
                            RegimeState::Unstable => quality.suppressed_watches += 1,
                            RegimeState::Normal => {}
                        }
                        watch_started = None;
                    }
                }
            }
        }

        if delay_count > 0 {
            quality.mean_confirmation_delay_seconds = Some(delay_total / delay_count as f64);
        }
        quality
    }

    pub fn compute_stability(
        &self,
        transitions: &[StateTransition],
        total_duration: f64,
    ) -> StabilityMetrics {
        self.stability_over_streams(std::iter::once(transitions), total_duration)
    }

    pub fn stability_over_streams<'a, I>(&self, streams: I, total_duration: f64) -> StabilityMetrics
    where
        I: IntoIterator<Item = &'a [StateTransition]>,
    {
        let mut stability = StabilityMetrics {
            total_duration_seconds: total_duration,
            ..Default::default()
        };
        let mut total_transitions = 0usize;
        let mut duration_total = 0.0;

        for stream in streams {
            let mut excursion_started: Option<Timestamp> = None;

            for t in stream {
                total_transitions += 1;
                if t.to_state.is_anomalous() {
                    stability.total_regimes += 1;
                    if t.to_state == RegimeState::Shifted {
                        stability.shifted_regimes += 1;
                    }
                    if t.from_state == RegimeState::Normal {
                        excursion_started = Some(t.timestamp);
                    }
                } else if let Some(start) = excursion_started.take() {
                    stability.completed_regimes += 1;
                    duration_total += seconds_between(start, t.timestamp);
                }
            }
        }

        if stability.completed_regimes > 0 {
            stability.mean_regime_duration_seconds =
                Some(duration_total / stability.completed_regimes as f64);
        }
        if total_duration > 0.0 {
            stability.transitions_per_hour = total_transitions as f64 * 3600.0 / total_duration;
        }
        stability
    }
}

/// Compare the distribution before and after a suspected shift
///
/// Population statistics; empty inputs count as mean 0, variance 0.
pub fn compute_variance_shift(pre_samples: &[f64], post_samples: &[f64]) -> VarianceShift {
    let (pre_mean, pre_variance) = mean_and_variance(pre_samples);
    let (post_mean, post_variance) = mean_and_variance(post_samples);

    VarianceShift {
        pre_mean,
        post_mean,
        mean_shift: post_mean - pre_mean,
        pre_variance,
        post_variance,
        ratio: post_variance / pre_variance.max(VARIANCE_FLOOR),
    }
}

fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().fold(0.0, |acc, &x| acc + x) / n;
    let variance = values.iter().fold(0.0, |acc, &x| acc + (x - mean) * (x - mean)) / n;
    (mean, variance)
}
