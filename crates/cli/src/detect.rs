//! Detection run

use anyhow::{Context, Result};
use blackice_core::EventRecord;
use blackice_pipeline::{CsvRowSource, Pipeline, PipelineConfig, PipelineMetrics};
use blackice_ports::RowSource;
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Detect regime shifts in machine telemetry
#[derive(Parser, Debug, Clone)]
#[command(name = "blackice")]
#[command(about = "Detect regime shifts in machine telemetry", long_about = None)]
#[command(version)]
pub struct DetectArgs {
    /// Telemetry CSV (machine_id,timestamp,cpu_util,mem_util)
    #[arg(long)]
    pub data: PathBuf,

    /// JSON pipeline configuration
    #[arg(short, long, env = "BLACKICE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only process this machine
    #[arg(short, long)]
    pub machine: Option<String>,

    /// Rows per processed chunk
    #[arg(long, default_value_t = 10_000)]
    pub chunk_size: usize,

    /// Write transition events as a JSON array
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the metrics report as JSON
    #[arg(long)]
    pub report: bool,

    /// Worker threads; 1 processes sequentially
    #[arg(long, default_value_t = 1)]
    pub workers: usize,

    #[arg(long)]
    pub window_size: Option<usize>,

    #[arg(long)]
    pub zscore_threshold: Option<f64>,

    #[arg(long)]
    pub min_consecutive_points: Option<usize>,

    #[arg(long)]
    pub min_fraction: Option<f64>,
}

impl DetectArgs {
    /// Load the config file (or defaults) and apply flag overrides
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(window_size) = self.window_size {
            config.window_size = window_size;
        }
        if let Some(threshold) = self.zscore_threshold {
            config.zscore_threshold = threshold;
        }
        if let Some(min_consecutive) = self.min_consecutive_points {
            config.min_consecutive_points = min_consecutive;
        }
        if let Some(fraction) = self.min_fraction {
            config.min_fraction_of_window = fraction;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

/// Metrics report printed with `--report`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub data: String,
    pub config: PipelineConfig,
    pub events: usize,
    pub metrics: PipelineMetrics,
}

#[derive(Debug, Clone)]
pub struct DetectSummary {
    pub records: Vec<EventRecord>,
    pub report: RunReport,
}

pub fn run(args: &DetectArgs) -> Result<DetectSummary> {
    let config = args.pipeline_config()?;
    log::info!(
        "Configuration: window={} z={} consecutive={} fraction={}",
        config.window_size,
        config.zscore_threshold,
        config.min_consecutive_points,
        config.min_fraction_of_window
    );

    let mut source = CsvRowSource::open(&args.data)
        .with_context(|| format!("Failed to open {}", args.data.display()))?
        .with_chunk_size(args.chunk_size);
    if let Some(machine) = &args.machine {
        source = source.with_entity(machine.as_str());
    }

    let mut pipeline = Pipeline::new(config.clone()).context("Invalid configuration")?;
    let mut records = Vec::new();

    while let Some(chunk) = source
        .next_chunk()
        .with_context(|| format!("Failed to read {}", args.data.display()))?
    {
        let events = pipeline.process_parallel(&chunk, args.workers);
        records.extend(events.iter().map(|event| event.to_record()));
    }
    pipeline.stop();

    if let Some(path) = &args.output {
        write_records(path, &records)?;
        log::info!("Wrote {} events to {}", records.len(), path.display());
    }

    let report = RunReport {
        generated_at: Utc::now(),
        data: args.data.display().to_string(),
        config,
        events: records.len(),
        metrics: pipeline.get_all_metrics(),
    };

    Ok(DetectSummary { records, report })
}

fn write_records(path: &Path, records: &[EventRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = DetectArgs::try_parse_from(["blackice", "--data", "usage.csv"]).unwrap();
        assert_eq!(args.chunk_size, 10_000);
        assert_eq!(args.workers, 1);
        assert!(!args.report);
        assert_eq!(args.pipeline_config().unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_data_required() {
        assert!(DetectArgs::try_parse_from(["blackice"]).is_err());
    }

    #[test]
    fn test_flag_overrides() {
        let args = DetectArgs::try_parse_from([
            "blackice",
            "--data",
            "usage.csv",
            "--window-size",
            "20",
            "--zscore-threshold",
            "3.5",
            "--min-consecutive-points",
            "4",
            "--min-fraction",
            "0.1",
        ])
        .unwrap();

        let config = args.pipeline_config().unwrap();
        assert_eq!(config.window_size, 20);
        assert_eq!(config.zscore_threshold, 3.5);
        assert_eq!(config.min_consecutive_points, 4);
        assert_eq!(config.min_fraction_of_window, 0.1);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = DetectArgs::try_parse_from([
            "blackice",
            "--data",
            "usage.csv",
            "--zscore-threshold",
            "0",
        ])
        .unwrap();
        assert!(args.pipeline_config().is_err());
    }
}
