//! Pipeline integration tests
//!
//! Synthetic telemetry with two level shifts, multi-entity routing and
//! run-to-run determinism.

use approx::assert_relative_eq;
use blackice_core::{Direction, Metric, RegimeState, Row};
use blackice_pipeline::{CsvRowSource, Pipeline, PipelineConfig};
use blackice_ports::RowSource;

fn synthetic_config() -> PipelineConfig {
    PipelineConfig {
        window_size: 20,
        zscore_threshold: 2.0,
        min_consecutive_points: 5,
        min_fraction_of_window: 0.2,
        ..Default::default()
    }
}

/// 100 quiet rows, 100 rows shifted up by 30, 100 quiet rows
fn synthetic_rows(entity: &str) -> Vec<Row> {
    (0..300i64)
        .map(|ts| {
            let offset = if (100..200).contains(&ts) { 30.0 } else { 0.0 };
            let cpu = 50.0 + (ts % 5) as f64 - 2.0 + offset;
            let mem = 40.0 + (ts % 3) as f64 - 1.0 + offset;
            Row::new(entity, ts).with_cpu(cpu).with_memory(mem)
        })
        .collect()
}

/// Fifty flat samples, a ten sample spike on cpu, then flat again
fn fixed_rows() -> Vec<Row> {
    (0..100i64)
        .map(|i| {
            let cpu = if (50..60).contains(&i) { 90.0 } else { 50.0 };
            Row::new("m_fixed", 1000 + i).with_cpu(cpu).with_memory(40.0)
        })
        .collect()
}

#[test]
fn test_synthetic_shifts_detected() {
    let _ = env_logger::try_init();

    let mut pipeline = Pipeline::new(synthetic_config())
        .unwrap()
        .with_event_history();
    let events = pipeline.process(&synthetic_rows("t"));
    pipeline.stop();

    let summary: Vec<(Metric, i64, RegimeState)> = events
        .iter()
        .map(|e| (e.metric, e.timestamp(), e.event.state))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Metric::Cpu, 100, RegimeState::Unstable),
            (Metric::Memory, 100, RegimeState::Unstable),
            (Metric::Cpu, 104, RegimeState::Shifted),
            (Metric::Memory, 104, RegimeState::Shifted),
            (Metric::Cpu, 105, RegimeState::Normal),
            (Metric::Memory, 105, RegimeState::Normal),
            (Metric::Cpu, 200, RegimeState::Unstable),
            (Metric::Memory, 200, RegimeState::Unstable),
            (Metric::Cpu, 204, RegimeState::Normal),
            (Metric::Memory, 204, RegimeState::Shifted),
            (Metric::Memory, 205, RegimeState::Normal),
        ]
    );

    let shift = events[2].transition().unwrap();
    assert_eq!(shift.direction, Direction::High);
    assert_eq!(events[9].transition().unwrap().direction, Direction::Low);
    assert!(events[0].event.zscore > 2.0);
    assert!(events[6].event.zscore < -2.0);

    assert_eq!(pipeline.events().len(), 11);
}

#[test]
fn test_synthetic_metrics() {
    let mut pipeline = Pipeline::new(synthetic_config()).unwrap();
    pipeline.process(&synthetic_rows("t"));
    pipeline.stop();

    let metrics = pipeline.get_all_metrics();

    assert_eq!(metrics.systems.rows_processed, 300);
    assert_eq!(metrics.systems.chunks_processed, 1);
    assert_eq!(metrics.systems.detectors, 2);
    assert_eq!(metrics.systems.rejected_samples, 0);

    let detection = &metrics.detection;
    assert_eq!(detection.total_transitions, 11);
    assert_eq!(detection.unstable_entries, 4);
    assert_eq!(detection.confirmed_shifts, 3);
    assert_eq!(detection.high_shifts, 2);
    assert_eq!(detection.low_shifts, 1);
    assert_eq!(detection.recoveries, 3);
    assert_eq!(detection.suppressed_watches, 1);
    assert_relative_eq!(detection.mean_confirmation_delay_seconds.unwrap(), 4.0);

    let stability = &metrics.stability;
    assert_eq!(stability.total_regimes, 7);
    assert_eq!(stability.shifted_regimes, 3);
    assert_eq!(stability.completed_regimes, 4);
    assert_relative_eq!(stability.mean_regime_duration_seconds.unwrap(), 4.75);
    assert_relative_eq!(stability.total_duration_seconds, 299.0);
    assert_relative_eq!(stability.transitions_per_hour, 11.0 * 3600.0 / 299.0);

    let json = serde_json::to_value(&metrics).unwrap();
    for key in ["systems", "detection", "stability"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn test_runs_are_deterministic() {
    let run = || {
        let mut pipeline = Pipeline::new(synthetic_config()).unwrap();
        pipeline.process(&fixed_rows())
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);

    assert_eq!(first.len(), 2);
    assert_eq!(first[0].timestamp(), 1051);
    assert_eq!(first[0].event.state, RegimeState::Unstable);
    assert_relative_eq!(first[0].event.zscore, 19.0f64.sqrt(), epsilon = 1e-9);
    assert_eq!(first[1].timestamp(), 1055);
    assert_eq!(first[1].event.state, RegimeState::Normal);
    assert_relative_eq!(first[1].event.zscore, 3.0f64.sqrt(), epsilon = 1e-9);
}

#[test]
fn test_event_history_is_opt_in() {
    let rows = fixed_rows();

    let mut plain = Pipeline::new(synthetic_config()).unwrap();
    let emitted = plain.process(&rows);
    assert_eq!(emitted.len(), 2);
    assert!(plain.events().is_empty());

    let mut recording = Pipeline::new(synthetic_config())
        .unwrap()
        .with_event_history();
    let mut expected = recording.process(&rows[..55]);
    expected.extend(recording.process(&rows[55..]));
    assert_eq!(recording.events(), expected.as_slice());
    assert_eq!(recording.events(), emitted.as_slice());
}

#[test]
fn test_flat_baseline_scores_zero() {
    let mut pipeline = Pipeline::new(synthetic_config()).unwrap();
    let rows = fixed_rows();

    // Through the first spike sample the cpu window is constant
    let events = pipeline.process(&rows[..51]);
    assert!(events.is_empty());
    assert_eq!(pipeline.state_of("m_fixed", Metric::Cpu), Some(RegimeState::Normal));
}

#[test]
fn test_missing_values_skipped() {
    let mut pipeline = Pipeline::new(synthetic_config()).unwrap();
    let rows: Vec<Row> = (0..30i64)
        .map(|ts| {
            let row = Row::new("m_1", ts).with_cpu(50.0 + (ts % 2) as f64);
            if ts % 3 == 0 { row.with_memory(40.0) } else { row }
        })
        .collect();

    pipeline.process(&rows);

    let cpu = pipeline.detector("m_1", Metric::Cpu).unwrap();
    let mem = pipeline.detector("m_1", Metric::Memory).unwrap();
    assert_eq!(cpu.baseline().count(), 30);
    assert_eq!(mem.baseline().count(), 10);
}

#[test]
fn test_entities_are_independent() {
    let mut pipeline = Pipeline::new(synthetic_config()).unwrap();

    let mut rows = Vec::new();
    let quiet = synthetic_rows("m_quiet");
    for (shifted, quiet) in synthetic_rows("m_shift").into_iter().zip(quiet) {
        rows.push(shifted);
        // Quiet entity never leaves its first level
        let ts = quiet.timestamp;
        rows.push(Row::new("m_quiet", ts).with_cpu(50.0 + (ts % 5) as f64 - 2.0));
    }

    let events = pipeline.process(&rows);

    assert_eq!(events.len(), 11);
    assert!(events.iter().all(|e| e.entity_id == "m_shift"));
    assert_eq!(pipeline.detector_count(), 3);
    assert_eq!(pipeline.state_of("m_quiet", Metric::Cpu), Some(RegimeState::Normal));
}

#[test]
fn test_parallel_matches_sequential() {
    let mut rows = Vec::new();
    let streams: Vec<Vec<Row>> = (0..6).map(|i| synthetic_rows(&format!("m_{i}"))).collect();
    for ts in 0..300 {
        for stream in &streams {
            rows.push(stream[ts].clone());
        }
    }

    let mut sequential = Pipeline::new(synthetic_config()).unwrap();
    let expected = sequential.process(&rows);

    let mut parallel = Pipeline::new(synthetic_config()).unwrap();
    let actual = parallel.process_parallel(&rows, 4);

    assert_eq!(expected.len(), 66);
    assert_eq!(expected, actual);
    assert_eq!(sequential.transitions(), parallel.transitions());
    assert_eq!(
        sequential.get_all_metrics().detection,
        parallel.get_all_metrics().detection
    );
}

#[test]
fn test_chunked_csv_matches_single_pass() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("telemetry.csv");

    let mut text = String::from("machine_id,timestamp,cpu_util,mem_util\n");
    for row in synthetic_rows("t") {
        text.push_str(&format!(
            "{},{},{},{}\n",
            row.entity_id,
            row.timestamp,
            row.cpu_util.unwrap(),
            row.mem_util.unwrap()
        ));
    }
    std::fs::write(&path, text).unwrap();

    let mut source = CsvRowSource::open(&path).unwrap().with_chunk_size(64);
    let mut pipeline = Pipeline::new(synthetic_config()).unwrap();
    let mut events = Vec::new();
    while let Some(chunk) = source.next_chunk().unwrap() {
        events.extend(pipeline.process(&chunk));
    }

    let mut single = Pipeline::new(synthetic_config()).unwrap();
    assert_eq!(events, single.process(&synthetic_rows("t")));

    let metrics = pipeline.get_all_metrics();
    assert_eq!(metrics.systems.rows_processed, 300);
    assert_eq!(metrics.systems.chunks_processed, 5);
}
