//! Single-stream convenience wrapper

use blackice_core::{RegimeState, StateEvent, Timestamp};

use crate::config::DetectorConfig;
use crate::error::Result;
use crate::unit::DetectorUnit;

/// A `DetectorUnit` that timestamps samples by arrival order
///
/// ```ignore
/// let mut detector = RegimeDetector::new(10, 2.0, 3, 0.0)?;
/// let event = detector.update(51.2);
/// println!("{} (z={:.1})", event.state, event.zscore);
/// ```
#[derive(Debug, Clone)]
pub struct RegimeDetector {
    unit: DetectorUnit,
    next_tick: Timestamp,
}

impl RegimeDetector {
    pub fn new(
        window_size: usize,
        z_threshold: f64,
        persistence: usize,
        min_fraction: f64,
    ) -> Result<Self> {
        let config = DetectorConfig::new(window_size, z_threshold, persistence, min_fraction)?;
        Self::with_config(&config)
    }

    pub fn with_config(config: &DetectorConfig) -> Result<Self> {
        Ok(Self {
            unit: DetectorUnit::new(config, "detector")?,
            next_tick: 0,
        })
    }

    pub fn update(&mut self, value: f64) -> StateEvent {
        let tick = self.next_tick;
        self.next_tick += 1;
        self.unit.tick(value, tick)
    }

    pub fn state(&self) -> RegimeState {
        self.unit.state()
    }

    pub fn unit(&self) -> &DetectorUnit {
        &self.unit
    }
}
