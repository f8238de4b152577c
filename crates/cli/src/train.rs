//! Offline training run

use anyhow::{Context, Result};
use blackice_learning::{
    DEFAULT_CPU_THRESHOLD, GridSearchOptimizer, ParamGrid, SearchOutcome, WeightedLoss,
    heuristic_ground_truth,
};
use blackice_pipeline::CsvRowSource;
use blackice_ports::RowSource;
use clap::Parser;
use std::path::PathBuf;

/// Learn detector parameters from historical telemetry
#[derive(Parser, Debug, Clone)]
#[command(name = "blackice-train")]
#[command(about = "Learn detector parameters from historical telemetry", long_about = None)]
#[command(version)]
pub struct TrainArgs {
    /// Training CSV (machine_id,timestamp,cpu_util,mem_util)
    pub data: PathBuf,

    /// Where to write the learned configuration
    #[arg(short, long, default_value = "configs/learned_config.json")]
    pub output: PathBuf,

    /// CPU level above which rows are labeled anomalous
    #[arg(long, default_value_t = DEFAULT_CPU_THRESHOLD)]
    pub cpu_threshold: f64,

    /// Train on a single machine
    #[arg(short, long)]
    pub machine: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub intervals: usize,
    pub outcome: SearchOutcome,
    pub output: PathBuf,
}

pub fn run(args: &TrainArgs) -> Result<TrainSummary> {
    log::info!("Loading training data from {}", args.data.display());
    let mut source = CsvRowSource::open(&args.data)
        .with_context(|| format!("Failed to open {}", args.data.display()))?;
    if let Some(machine) = &args.machine {
        source = source.with_entity(machine.as_str());
    }
    let rows = source
        .read_all()
        .with_context(|| format!("Failed to read {}", args.data.display()))?;
    log::info!("Loaded {} rows", rows.len());

    let ground_truth = heuristic_ground_truth(&rows, args.cpu_threshold);
    log::info!(
        "Found {} anomaly intervals (cpu > {})",
        ground_truth.len(),
        args.cpu_threshold
    );
    if ground_truth.is_empty() {
        log::warn!("No anomalies labeled; every quiet candidate will tie");
    }

    let optimizer = GridSearchOptimizer::new(ParamGrid::reduced(), WeightedLoss::default());
    let outcome = optimizer
        .search(&rows, &ground_truth)
        .context("Grid search failed")?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    outcome
        .best_config
        .to_file(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(TrainSummary {
        intervals: ground_truth.len(),
        outcome,
        output: args.output.clone(),
    })
}
