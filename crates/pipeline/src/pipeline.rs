//! Pipeline - routes rows to per-(entity, metric) detectors
//!
//! The registry is a `DashMap` sharded by key: once a detector exists it is
//! only ever touched by the worker that owns its entity, so the map's own
//! shard lock on first sight of a key is the only contention point.

use blackice_core::{
    DetectionEvent, EntityId, Metric, RegimeState, Row, StateEvent, StateTransition, Timestamp,
    seconds_between,
};
use blackice_detector::{ConfigError, DetectorUnit};
use dashmap::DashMap;
use dashmap::mapref::one::Ref;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::metrics::{MetricsComputer, PipelineMetrics, SystemsMetrics};

/// Registry key: one detector per (entity, metric)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DetectorKey {
    pub entity_id: EntityId,
    pub metric: Metric,
}

impl DetectorKey {
    pub fn new(entity_id: impl Into<EntityId>, metric: Metric) -> Self {
        Self {
            entity_id: entity_id.into(),
            metric,
        }
    }
}

impl fmt::Display for DetectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity_id, self.metric)
    }
}

/// Multi-entity detection pipeline
pub struct Pipeline {
    config: PipelineConfig,
    /// Enabled metrics in routing order
    metrics: Vec<Metric>,
    /// Cold unit cloned for every new key
    prototype: DetectorUnit,
    registry: DashMap<DetectorKey, DetectorUnit>,
    /// Emitted transition events, kept only with history enabled
    events: Vec<DetectionEvent>,
    retain_events: bool,
    computer: MetricsComputer,
    first_ts: Option<Timestamp>,
    last_ts: Option<Timestamp>,
}

impl Pipeline {
    /// Create a pipeline; fails if the configuration is invalid
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        let prototype = DetectorUnit::new(&config.detector_config(), "prototype")?;
        let mut computer = MetricsComputer::new();
        computer.start_processing();

        Ok(Self {
            metrics: config.enabled_metrics(),
            config,
            prototype,
            registry: DashMap::new(),
            events: Vec::new(),
            retain_events: false,
            computer,
            first_ts: None,
            last_ts: None,
        })
    }

    /// Keep a copy of every emitted event, readable through [`Pipeline::events`]
    pub fn with_event_history(mut self) -> Self {
        self.retain_events = true;
        self
    }

    /// Process one chunk of rows in the order given
    ///
    /// Returns only the ticks that changed a detector's state.
    pub fn process(&mut self, rows: &[Row]) -> Vec<DetectionEvent> {
        let started = Instant::now();
        let mut output = Vec::new();

        for row in rows {
            for &metric in &self.metrics {
                let Some(value) = row.value(metric) else {
                    continue;
                };
                let event = tick(&self.registry, &self.prototype, row, metric, value);
                if let Some(detection) = DetectionEvent::from_tick(&row.entity_id, metric, event) {
                    output.push(detection);
                }
            }
        }

        self.finish_chunk(rows, started, &output);
        output
    }

    /// Same result as `process`, with entities spread over `workers` threads
    ///
    /// Rows are partitioned by entity id so each detector is driven by a
    /// single thread in its original order; results are merged back into
    /// row order.
    pub fn process_parallel(&mut self, rows: &[Row], workers: usize) -> Vec<DetectionEvent> {
        if workers <= 1 {
            return self.process(rows);
        }
        let started = Instant::now();

        let mut partitions: Vec<Vec<usize>> = vec![Vec::new(); workers];
        for (index, row) in rows.iter().enumerate() {
            partitions[partition_of(&row.entity_id, workers)].push(index);
        }

        let registry = &self.registry;
        let prototype = &self.prototype;
        let metrics = &self.metrics;

        let mut tagged: Vec<(usize, usize, DetectionEvent)> = std::thread::scope(|scope| {
            let handles: Vec<_> = partitions
                .iter()
                .filter(|partition| !partition.is_empty())
                .map(|partition| {
                    scope.spawn(move || {
                        let mut local = Vec::new();
                        for &index in partition {
                            let row = &rows[index];
                            for (order, &metric) in metrics.iter().enumerate() {
                                let Some(value) = row.value(metric) else {
                                    continue;
                                };
                                let event = tick(registry, prototype, row, metric, value);
                                if let Some(detection) =
                                    DetectionEvent::from_tick(&row.entity_id, metric, event)
                                {
                                    local.push((index, order, detection));
                                }
                            }
                        }
                        local
                    })
                })
                .collect();

            let mut merged = Vec::new();
            for handle in handles {
                match handle.join() {
                    Ok(local) => merged.extend(local),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            merged
        });

        tagged.sort_by_key(|(index, order, _)| (*index, *order));
        let output: Vec<DetectionEvent> = tagged.into_iter().map(|(_, _, event)| event).collect();

        self.finish_chunk(rows, started, &output);
        output
    }

    fn finish_chunk(&mut self, rows: &[Row], started: Instant, output: &[DetectionEvent]) {
        for row in rows {
            self.first_ts = Some(self.first_ts.map_or(row.timestamp, |ts| ts.min(row.timestamp)));
            self.last_ts = Some(self.last_ts.map_or(row.timestamp, |ts| ts.max(row.timestamp)));
        }

        let elapsed = started.elapsed().as_secs_f64();
        self.computer.record_chunk(rows.len(), elapsed);
        if self.retain_events {
            self.events.extend_from_slice(output);
        }

        log::info!(
            "Processed chunk: {} rows, {} transitions, {} detectors in {:.3}s",
            rows.len(),
            output.len(),
            self.registry.len(),
            elapsed
        );
    }

    /// Finalize elapsed-time accounting
    pub fn stop(&mut self) {
        self.computer.stop();
    }

    pub fn get_all_metrics(&self) -> PipelineMetrics {
        let streams = self.transitions();
        let slices = || streams.iter().map(|(_, transitions)| transitions.as_slice());

        let total_duration = match (self.first_ts, self.last_ts) {
            (Some(first), Some(last)) => seconds_between(first, last),
            _ => 0.0,
        };

        let rejected_samples = self
            .registry
            .iter()
            .map(|entry| entry.value().rejected_samples())
            .sum();

        PipelineMetrics {
            systems: SystemsMetrics {
                rejected_samples,
                detectors: self.registry.len(),
                ..self.computer.compute_systems_metrics()
            },
            detection: self.computer.detection_over_streams(slices()),
            stability: self.computer.stability_over_streams(slices(), total_duration),
        }
    }

    /// Every recorded transition, grouped per detector in key order
    pub fn transitions(&self) -> Vec<(DetectorKey, Vec<StateTransition>)> {
        let mut streams: Vec<(DetectorKey, Vec<StateTransition>)> = self
            .registry
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().transitions().to_vec()))
            .collect();
        streams.sort_by(|a, b| a.0.cmp(&b.0));
        streams
    }

    /// Transition events emitted since history was enabled; empty otherwise
    pub fn events(&self) -> &[DetectionEvent] {
        &self.events
    }

    pub fn detector(
        &self,
        entity_id: &str,
        metric: Metric,
    ) -> Option<Ref<'_, DetectorKey, DetectorUnit>> {
        self.registry.get(&DetectorKey::new(entity_id, metric))
    }

    /// Current state of a detector, if it exists
    pub fn state_of(&self, entity_id: &str, metric: Metric) -> Option<RegimeState> {
        self.detector(entity_id, metric).map(|unit| unit.state())
    }

    pub fn detector_count(&self) -> usize {
        self.registry.len()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

/// Route one value to its detector, creating the detector on first sight
fn tick(
    registry: &DashMap<DetectorKey, DetectorUnit>,
    prototype: &DetectorUnit,
    row: &Row,
    metric: Metric,
    value: f64,
) -> StateEvent {
    let key = DetectorKey::new(row.entity_id.as_str(), metric);

    // Fast path: detector exists
    if let Some(mut unit) = registry.get_mut(&key) {
        return unit.tick(value, row.timestamp);
    }

    // Slow path: create it
    let mut unit = registry.entry(key).or_insert_with(|| {
        let name = format!("{}/{}", row.entity_id, metric);
        log::debug!("Creating detector {}", name);
        prototype.fresh(name)
    });
    unit.tick(value, row.timestamp)
}

fn partition_of(entity_id: &str, workers: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    entity_id.hash(&mut hasher);
    (hasher.finish() % workers as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig {
            window_size: 10,
            zscore_threshold: 2.0,
            min_consecutive_points: 3,
            min_fraction_of_window: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_detectors_created_lazily_per_key() {
        let mut pipeline = Pipeline::new(config()).unwrap();
        assert_eq!(pipeline.detector_count(), 0);

        pipeline.process(&[
            Row::new("m_1", 0).with_cpu(50.0).with_memory(40.0),
            Row::new("m_2", 0).with_cpu(50.0),
            Row::new("m_1", 1).with_cpu(51.0).with_memory(41.0),
        ]);

        assert_eq!(pipeline.detector_count(), 3);
        assert!(pipeline.detector("m_1", Metric::Memory).is_some());
        assert!(pipeline.detector("m_2", Metric::Memory).is_none());
        assert_eq!(
            pipeline.detector("m_1", Metric::Cpu).unwrap().baseline().count(),
            2
        );
    }

    #[test]
    fn test_disabled_metric_is_not_routed() {
        let mut pipeline = Pipeline::new(PipelineConfig {
            track_memory: false,
            ..config()
        })
        .unwrap();

        pipeline.process(&[Row::new("m_1", 0).with_cpu(50.0).with_memory(40.0)]);
        assert_eq!(pipeline.detector_count(), 1);
        assert_eq!(pipeline.state_of("m_1", Metric::Memory), None);
        assert_eq!(pipeline.state_of("m_1", Metric::Cpu), Some(RegimeState::Normal));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Pipeline::new(PipelineConfig {
            window_size: 0,
            ..config()
        });
        assert!(matches!(result, Err(ConfigError::InvalidWindowSize)));
    }

    #[test]
    fn test_rows_counted_per_chunk() {
        let mut pipeline = Pipeline::new(config()).unwrap();
        let rows: Vec<Row> = (0..25).map(|ts| Row::new("m_1", ts).with_cpu(50.0)).collect();

        pipeline.process(&rows[..10]);
        pipeline.process(&rows[10..]);
        pipeline.stop();

        let metrics = pipeline.get_all_metrics();
        assert_eq!(metrics.systems.rows_processed, 25);
        assert_eq!(metrics.systems.chunks_processed, 2);
        assert_eq!(metrics.systems.detectors, 1);
        assert_eq!(metrics.stability.total_duration_seconds, 24.0);
    }

    #[test]
    fn test_rejected_samples_reported() {
        let mut pipeline = Pipeline::new(config()).unwrap();
        pipeline.process(&[
            Row::new("m_1", 0).with_cpu(f64::NAN),
            Row::new("m_1", 1).with_cpu(50.0),
            Row::new("m_1", 2).with_cpu(f64::INFINITY),
        ]);

        assert_eq!(pipeline.get_all_metrics().systems.rejected_samples, 2);
    }

    #[test]
    fn test_partition_is_stable() {
        for workers in 2..8 {
            let p = partition_of("m_1932", workers);
            assert!(p < workers);
            assert_eq!(p, partition_of("m_1932", workers));
        }
    }
}
