//! Weighted detection loss
//!
//! Scores a detection run against labeled anomaly intervals:
//!
//! ```text
//! loss = false_positives * w_fp + false_negatives * w_fn + delay_seconds * w_delay
//! ```

use blackice_core::{AnomalyInterval, DetectionEvent, seconds_between};
use blackice_ports::LossFunction;
use serde::{Deserialize, Serialize};

/// Penalty weights; lower total loss is better
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedLoss {
    /// Cost of a transition outside every labeled interval
    pub false_positive: f64,
    /// Cost of a labeled interval with no transition inside it
    pub false_negative: f64,
    /// Cost per second between interval start and each transition inside it
    pub delay_per_second: f64,
}

impl Default for WeightedLoss {
    fn default() -> Self {
        Self {
            false_positive: 5.0,
            false_negative: 10.0,
            delay_per_second: 0.1,
        }
    }
}

/// Components of a loss evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LossBreakdown {
    pub false_positives: usize,
    pub false_negatives: usize,
    pub total_delay_seconds: f64,
    pub loss: f64,
}

impl WeightedLoss {
    pub fn new(false_positive: f64, false_negative: f64, delay_per_second: f64) -> Self {
        Self {
            false_positive,
            false_negative,
            delay_per_second,
        }
    }

    pub fn evaluate(
        &self,
        events: &[DetectionEvent],
        ground_truth: &[AnomalyInterval],
    ) -> LossBreakdown {
        let mut breakdown = LossBreakdown::default();
        let mut detected = vec![false; ground_truth.len()];

        for transition in events.iter().filter_map(DetectionEvent::transition) {
            let ts = transition.timestamp;
            // First containing interval claims the transition
            match ground_truth.iter().position(|interval| interval.contains(ts)) {
                Some(index) => {
                    detected[index] = true;
                    let start = ground_truth[index].start_time;
                    breakdown.total_delay_seconds += seconds_between(start, ts).max(0.0);
                }
                None => breakdown.false_positives += 1,
            }
        }

        breakdown.false_negatives = detected.iter().filter(|hit| !**hit).count();
        breakdown.loss = breakdown.false_positives as f64 * self.false_positive
            + breakdown.false_negatives as f64 * self.false_negative
            + breakdown.total_delay_seconds * self.delay_per_second;
        breakdown
    }
}

impl LossFunction for WeightedLoss {
    fn loss(&self, events: &[DetectionEvent], ground_truth: &[AnomalyInterval]) -> f64 {
        self.evaluate(events, ground_truth).loss
    }

    fn name(&self) -> &str {
        "WeightedLoss"
    }
}
