//! Training binary
//!
//! Labels historical telemetry and searches for the detector parameters
//! with the lowest weighted loss.

use anyhow::Result;
use blackice_cli::{TrainArgs, init_logging, train};
use clap::Parser;

fn main() -> Result<()> {
    let args = TrainArgs::parse();
    init_logging();

    let summary = train::run(&args)?;
    let best = &summary.outcome.best_config;

    println!("Training complete");
    println!(
        "Best loss {:.4} over {} candidates ({} labeled intervals)",
        summary.outcome.best_loss,
        summary.outcome.candidates.len(),
        summary.intervals
    );
    println!(
        "window_size={} zscore_threshold={} min_consecutive_points={}",
        best.window_size, best.zscore_threshold, best.min_consecutive_points
    );
    println!("Learned configuration saved to {}", summary.output.display());
    println!(
        "Run the detector with: blackice --data <csv> --config {}",
        summary.output.display()
    );
    Ok(())
}
