//! Grid search over detector parameters

use blackice_core::{AnomalyInterval, Row};
use blackice_pipeline::{Pipeline, PipelineConfig};
use blackice_ports::LossFunction;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("Parameter grid is empty")]
    EmptyGrid,

    #[error("No valid candidate in grid ({skipped} skipped as invalid)")]
    NoValidCandidate { skipped: usize },
}

/// Values to try for each searched parameter
///
/// Candidates are the cartesian product in declaration order: window size
/// varies slowest, minimum consecutive points fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub window_size: Vec<usize>,
    pub zscore_threshold: Vec<f64>,
    pub min_consecutive_points: Vec<usize>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            window_size: vec![10, 20, 50, 100],
            zscore_threshold: vec![2.0, 3.0, 4.0, 5.0],
            min_consecutive_points: vec![3, 5, 8, 12],
        }
    }
}

impl ParamGrid {
    /// Smaller grid used by the training binary
    pub fn reduced() -> Self {
        Self {
            window_size: vec![10, 20, 50, 100],
            zscore_threshold: vec![2.5, 3.0, 4.0, 5.0],
            min_consecutive_points: vec![3, 5, 8],
        }
    }

    pub fn len(&self) -> usize {
        self.window_size.len() * self.zscore_threshold.len() * self.min_consecutive_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination applied on top of `base`
    pub fn candidates(&self, base: &PipelineConfig) -> Vec<PipelineConfig> {
        let mut configs = Vec::with_capacity(self.len());
        for &window_size in &self.window_size {
            for &zscore_threshold in &self.zscore_threshold {
                for &min_consecutive_points in &self.min_consecutive_points {
                    configs.push(PipelineConfig {
                        window_size,
                        zscore_threshold,
                        min_consecutive_points,
                        ..base.clone()
                    });
                }
            }
        }
        configs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub config: PipelineConfig,
    pub loss: f64,
    /// Transition events the candidate emitted
    pub events: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub best_config: PipelineConfig,
    pub best_loss: f64,
    /// Every evaluated candidate in grid order
    pub candidates: Vec<CandidateScore>,
    /// Candidates rejected by config validation
    pub skipped: usize,
}

pub struct GridSearchOptimizer<L> {
    grid: ParamGrid,
    loss: L,
    base: PipelineConfig,
}

impl<L: LossFunction> GridSearchOptimizer<L> {
    pub fn new(grid: ParamGrid, loss: L) -> Self {
        Self {
            grid,
            loss,
            base: PipelineConfig::default(),
        }
    }

    /// Fields not covered by the grid are taken from `base`
    pub fn with_base(mut self, base: PipelineConfig) -> Self {
        self.base = base;
        self
    }

    pub fn grid(&self) -> &ParamGrid {
        &self.grid
    }

    /// Run every candidate over `rows` and keep the lowest loss
    ///
    /// Ties keep the earliest candidate in grid order.
    pub fn search(
        &self,
        rows: &[Row],
        ground_truth: &[AnomalyInterval],
    ) -> Result<SearchOutcome, SearchError> {
        if self.grid.is_empty() {
            return Err(SearchError::EmptyGrid);
        }

        let configs = self.grid.candidates(&self.base);
        let total = configs.len();
        log::info!(
            "Starting grid search over {} configurations ({})",
            total,
            self.loss.name()
        );

        let mut candidates = Vec::with_capacity(total);
        let mut best: Option<(usize, f64)> = None;
        let mut skipped = 0;

        for (i, config) in configs.into_iter().enumerate() {
            let mut pipeline = match Pipeline::new(config.clone()) {
                Ok(pipeline) => pipeline,
                Err(e) => {
                    log::warn!("[{}/{}] Skipping invalid candidate: {}", i + 1, total, e);
                    skipped += 1;
                    continue;
                }
            };

            let events = pipeline.process(rows);
            let loss = self.loss.loss(&events, ground_truth);
            log::info!(
                "[{}/{}] window={} z={} consecutive={} -> loss {:.4} ({} events)",
                i + 1,
                total,
                config.window_size,
                config.zscore_threshold,
                config.min_consecutive_points,
                loss,
                events.len()
            );

            if best.is_none_or(|(_, best_loss)| loss < best_loss) {
                best = Some((candidates.len(), loss));
            }
            candidates.push(CandidateScore {
                config,
                loss,
                events: events.len(),
            });
        }

        let (index, best_loss) = best.ok_or(SearchError::NoValidCandidate { skipped })?;
        let best_config = candidates[index].config.clone();
        log::info!(
            "Best loss {:.4}: window={} z={} consecutive={}",
            best_loss,
            best_config.window_size,
            best_config.zscore_threshold,
            best_config.min_consecutive_points
        );

        Ok(SearchOutcome {
            best_config,
            best_loss,
            candidates,
            skipped,
        })
    }
}
