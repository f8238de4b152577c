//! One detector per (entity, metric) stream

use blackice_core::{RegimeState, StateEvent, StateTransition, Timestamp};

use crate::baseline::BaselineEstimator;
use crate::config::DetectorConfig;
use crate::deviation::DeviationScorer;
use crate::error::Result;
use crate::persistence::PersistenceValidator;
use crate::state::RegimeStateMachine;

/// Composes scorer (with its baseline), persistence filter and state machine
///
/// Must see its stream strictly in timestamp order.
#[derive(Debug, Clone)]
pub struct DetectorUnit {
    scorer: DeviationScorer,
    validator: PersistenceValidator,
    machine: RegimeStateMachine,
}

impl DetectorUnit {
    pub fn new(config: &DetectorConfig, name: impl Into<String>) -> Result<Self> {
        config.validate()?;
        let baseline = BaselineEstimator::new(config.window_size)?;
        Ok(Self {
            scorer: DeviationScorer::new(baseline, config.zscore_threshold)?,
            validator: PersistenceValidator::new(config.persistence())?,
            machine: RegimeStateMachine::new(name),
        })
    }

    /// Score, debounce and classify one sample
    pub fn tick(&mut self, value: f64, timestamp: Timestamp) -> StateEvent {
        let deviation = self.scorer.update(value, timestamp);
        let persistence = self.validator.check(&deviation);
        let transition = self.machine.process(&persistence, timestamp);

        let reason = match &transition {
            Some(t) => t.reason.clone(),
            None => persistence.describe(),
        };

        StateEvent {
            state: self.machine.current_state(),
            timestamp,
            zscore: deviation.zscore,
            reason,
            transition,
        }
    }

    /// A cold unit with the same parameters and a new name
    pub fn fresh(&self, name: impl Into<String>) -> Self {
        let mut scorer = self.scorer.clone();
        scorer.reset();
        let mut validator = self.validator.clone();
        validator.reset();
        Self {
            scorer,
            validator,
            machine: RegimeStateMachine::new(name),
        }
    }

    #[inline]
    pub fn state(&self) -> RegimeState {
        self.machine.current_state()
    }

    pub fn baseline(&self) -> &BaselineEstimator {
        self.scorer.baseline()
    }

    pub fn transitions(&self) -> &[StateTransition] {
        self.machine.transitions()
    }

    pub fn required_count(&self) -> usize {
        self.validator.required_count()
    }

    pub fn rejected_samples(&self) -> u64 {
        self.scorer.rejected_samples()
    }

    pub fn name(&self) -> &str {
        self.machine.metric_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackice_core::Direction;

    fn unit() -> DetectorUnit {
        let config = DetectorConfig::new(10, 2.0, 3, 0.0).unwrap();
        DetectorUnit::new(&config, "m_1/cpu_util").unwrap()
    }

    #[test]
    fn test_quiet_stream_stays_normal() {
        let mut unit = unit();
        for ts in 0..50 {
            let event = unit.tick(50.0 + (ts % 3) as f64 * 0.1, ts);
            assert_eq!(event.state, RegimeState::Normal);
            assert!(event.transition.is_none());
        }
        assert!(unit.transitions().is_empty());
        assert!(unit.baseline().is_ready());
    }

    #[test]
    fn test_spike_enters_unstable() {
        let mut unit = unit();
        for ts in 0..15 {
            unit.tick(50.0 + (ts % 2) as f64 * 0.2, ts);
        }

        let event = unit.tick(80.0, 15);
        assert_eq!(event.state, RegimeState::Unstable);
        assert!(event.zscore > 2.0);
        let transition = event.transition.unwrap();
        assert_eq!(transition.direction, Direction::High);
        assert_eq!(event.reason, transition.reason);
    }

    #[test]
    fn test_nan_does_not_abort() {
        let mut unit = unit();
        for ts in 0..15 {
            unit.tick(50.0 + (ts % 2) as f64 * 0.2, ts);
        }
        let event = unit.tick(f64::NAN, 15);
        assert_eq!(event.state, RegimeState::Normal);
        assert_eq!(unit.rejected_samples(), 1);
    }

    #[test]
    fn test_fresh_unit_is_cold() {
        let mut used = unit();
        for ts in 0..15 {
            used.tick(50.0 + (ts % 2) as f64 * 0.2, ts);
        }
        used.tick(80.0, 15);
        assert_eq!(used.state(), RegimeState::Unstable);

        let fresh = used.fresh("m_2/cpu_util");
        assert_eq!(fresh.state(), RegimeState::Normal);
        assert!(fresh.transitions().is_empty());
        assert!(!fresh.baseline().is_ready());
        assert_eq!(fresh.required_count(), used.required_count());
        assert_eq!(fresh.name(), "m_2/cpu_util");
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = DetectorConfig {
            window_size: 0,
            ..Default::default()
        };
        assert!(DetectorUnit::new(&config, "x").is_err());
    }
}
