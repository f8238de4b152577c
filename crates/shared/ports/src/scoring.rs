use blackice_core::{AnomalyInterval, DetectionEvent};

/// Port for scoring a detection run against labeled ground truth
///
/// Used by the offline optimizer to rank candidate configurations.
/// Lower is better.
pub trait LossFunction: Send + Sync {
    fn loss(&self, events: &[DetectionEvent], ground_truth: &[AnomalyInterval]) -> f64;

    /// Name for logging
    fn name(&self) -> &str {
        "LossFunction"
    }
}
