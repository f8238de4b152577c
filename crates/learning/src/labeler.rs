//! Heuristic ground truth
//!
//! Stand-in for human labels: sustained CPU saturation is treated as a true
//! anomaly.

use blackice_core::{AnomalyInterval, Row, Timestamp};

pub const DEFAULT_CPU_THRESHOLD: f64 = 95.0;

/// Intervals where `cpu_util` stays strictly above `cpu_threshold`
///
/// Rows are ordered by timestamp (stable for equal timestamps). An interval
/// ends at the first row that is not above the threshold; one still open at
/// the end closes at the last row's timestamp. Rows without a cpu value
/// count as not above.
pub fn heuristic_ground_truth(rows: &[Row], cpu_threshold: f64) -> Vec<AnomalyInterval> {
    let mut ordered: Vec<&Row> = rows.iter().collect();
    ordered.sort_by_key(|row| row.timestamp);

    let mut intervals = Vec::new();
    let mut open: Option<Timestamp> = None;

    for row in &ordered {
        let high = row.cpu_util.is_some_and(|cpu| cpu > cpu_threshold);
        match (high, open) {
            (true, None) => open = Some(row.timestamp),
            (false, Some(start)) => {
                intervals.push(AnomalyInterval::new(start, row.timestamp));
                open = None;
            }
            _ => {}
        }
    }

    if let (Some(start), Some(last)) = (open, ordered.last()) {
        intervals.push(AnomalyInterval::new(start, last.timestamp));
    }

    log::debug!(
        "Labeled {} intervals above cpu {:.1} from {} rows",
        intervals.len(),
        cpu_threshold,
        rows.len()
    );
    intervals
}
