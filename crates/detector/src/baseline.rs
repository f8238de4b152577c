//! Rolling baseline statistics
//!
//! Mean, population variance and standard deviation over the current
//! window contents. Statistics are recomputed from the window on every
//! accepted update, always summing oldest to newest, so identical input
//! sequences give bit-identical results (no drift from incremental
//! add/subtract updates).

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::window::RollingWindow;

/// Point-in-time view of a baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineSnapshot {
    /// Samples accepted since the last reset (saturating)
    pub count: u64,
    pub mean: f64,
    pub variance: f64,
    pub std: f64,
    /// Sticky once `count` reaches the window size
    pub is_ready: bool,
}

/// Online mean/variance over a rolling window
#[derive(Debug, Clone)]
pub struct BaselineEstimator {
    window: RollingWindow<f64>,
    window_size: usize,
    count: u64,
    mean: f64,
    variance: f64,
    std: f64,
    ready: bool,
}

impl BaselineEstimator {
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(ConfigError::InvalidWindowSize);
        }
        Ok(Self {
            window: RollingWindow::new(window_size),
            window_size,
            count: 0,
            mean: 0.0,
            variance: 0.0,
            std: 0.0,
            ready: false,
        })
    }

    /// Ingest a value. Returns false (and changes nothing) for NaN or infinite input.
    pub fn update(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }

        self.window.push(value);
        self.count = self.count.saturating_add(1);
        if self.count >= self.window_size as u64 {
            self.ready = true;
        }
        self.recompute();
        true
    }

    fn recompute(&mut self) {
        let n = self.window.size() as f64;
        let sum = self.window.iter().fold(0.0_f64, |acc, &x| acc + x);
        let mean = sum / n;
        let sum_sq_diff = self.window.iter().fold(0.0_f64, |acc, &x| {
            let diff = x - mean;
            acc + diff * diff
        });

        self.mean = mean;
        self.variance = sum_sq_diff / n;
        self.std = self.variance.sqrt();
    }

    /// Return to the cold state
    pub fn reset(&mut self) {
        self.window.clear();
        self.count = 0;
        self.mean = 0.0;
        self.variance = 0.0;
        self.std = 0.0;
        self.ready = false;
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    #[inline]
    pub fn variance(&self) -> f64 {
        self.variance
    }

    #[inline]
    pub fn std(&self) -> f64 {
        self.std
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// True once `window_size` samples have been accepted since the last reset
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Alias of `is_ready`
    #[inline]
    pub fn is_warm(&self) -> bool {
        self.ready
    }

    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of samples currently held
    #[inline]
    pub fn len(&self) -> usize {
        self.window.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn snapshot(&self) -> BaselineSnapshot {
        BaselineSnapshot {
            count: self.count,
            mean: self.mean,
            variance: self.variance,
            std: self.std,
            is_ready: self.ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_warms_exactly_at_window_size() {
        let mut baseline = BaselineEstimator::new(10).unwrap();
        assert!(!baseline.is_warm());
        assert!(!baseline.is_ready());
        assert_eq!(baseline.count(), 0);

        for i in 0..10 {
            assert!(!baseline.is_ready(), "ready too early at update {}", i);
            assert!(baseline.update(i as f64));
        }

        assert!(baseline.is_warm());
        assert!(baseline.is_ready());
        assert_eq!(baseline.count(), 10);
        assert_abs_diff_eq!(baseline.mean(), 4.5, epsilon = 1e-9);
        assert!(baseline.variance() > 0.0);
        assert!(baseline.std() > 0.0);
    }

    #[test]
    fn test_population_variance() {
        let mut baseline = BaselineEstimator::new(4).unwrap();
        for v in [2.0, 4.0, 4.0, 6.0] {
            baseline.update(v);
        }
        // Deviations -2, 0, 0, 2 -> sum of squares 8, divided by n = 4
        assert_abs_diff_eq!(baseline.mean(), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(baseline.variance(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut baseline = BaselineEstimator::new(10).unwrap();
        for i in 0..10 {
            baseline.update(i as f64);
        }
        let before = baseline.snapshot();

        assert!(!baseline.update(f64::NAN));
        assert!(!baseline.update(f64::INFINITY));
        assert!(!baseline.update(f64::NEG_INFINITY));

        assert_eq!(baseline.snapshot(), before);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut baseline = BaselineEstimator::new(3).unwrap();
        for v in [100.0, 1.0, 2.0, 3.0] {
            baseline.update(v);
        }
        assert_eq!(baseline.len(), 3);
        assert_abs_diff_eq!(baseline.mean(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ready_is_sticky_until_reset() {
        let mut baseline = BaselineEstimator::new(2).unwrap();
        baseline.update(1.0);
        baseline.update(2.0);
        baseline.update(3.0);
        assert!(baseline.is_ready());

        baseline.reset();
        assert!(!baseline.is_warm());
        assert_eq!(baseline.count(), 0);
        assert!(baseline.is_empty());
        assert_eq!(baseline.mean(), 0.0);
    }

    #[test]
    fn test_identical_inputs_are_bit_identical() {
        let values: Vec<f64> = (0..500).map(|i| (i as f64 * 0.37).sin() * 13.1 + 50.0).collect();

        let mut a = BaselineEstimator::new(32).unwrap();
        let mut b = BaselineEstimator::new(32).unwrap();
        for &v in &values {
            a.update(v);
            b.update(v);
            assert_eq!(a.mean().to_bits(), b.mean().to_bits());
            assert_eq!(a.variance().to_bits(), b.variance().to_bits());
        }
    }

    #[test]
    fn test_zero_window_rejected() {
        assert_eq!(
            BaselineEstimator::new(0).unwrap_err(),
            ConfigError::InvalidWindowSize
        );
    }
}
