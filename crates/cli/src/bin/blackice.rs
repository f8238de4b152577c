//! Detection binary
//!
//! Streams a telemetry CSV through the pipeline and reports regime
//! transitions.

use anyhow::Result;
use blackice_cli::{DetectArgs, detect, init_logging};
use clap::Parser;

fn main() -> Result<()> {
    let args = DetectArgs::parse();
    init_logging();

    let summary = detect::run(&args)?;

    for record in &summary.records {
        log::info!(
            "{} {} t={} {} -> {} ({}, z={:.2})",
            record.entity_id,
            record.metric,
            record.timestamp,
            record.from_state,
            record.to_state,
            record.direction,
            record.zscore
        );
    }

    if args.report {
        println!("{}", serde_json::to_string_pretty(&summary.report)?);
    }

    let systems = &summary.report.metrics.systems;
    println!(
        "Processing complete: {} rows, {} detectors, {} transitions",
        systems.rows_processed, systems.detectors, summary.report.events
    );
    Ok(())
}
