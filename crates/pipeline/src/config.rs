//! Pipeline configuration
//!
//! Loaded from JSON. Every field is optional in the document and falls
//! back to its default.

use blackice_core::Metric;
use blackice_detector::{ConfigError, DetectorConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigFileError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub window_size: usize,
    pub zscore_threshold: f64,
    pub min_consecutive_points: usize,
    pub min_fraction_of_window: f64,
    /// Route `cpu_util` to detectors
    pub track_cpu: bool,
    /// Route `mem_util` to detectors
    pub track_memory: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let detector = DetectorConfig::default();
        Self {
            window_size: detector.window_size,
            zscore_threshold: detector.zscore_threshold,
            min_consecutive_points: detector.min_consecutive_points,
            min_fraction_of_window: detector.min_fraction_of_window,
            track_cpu: true,
            track_memory: true,
        }
    }
}

impl PipelineConfig {
    /// Load and validate a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigFileError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write as pretty-printed JSON
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigFileError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detector_config().validate()
    }

    /// Parameters handed to every detector
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            window_size: self.window_size,
            zscore_threshold: self.zscore_threshold,
            min_consecutive_points: self.min_consecutive_points,
            min_fraction_of_window: self.min_fraction_of_window,
        }
    }

    /// Metrics routed to detectors, in routing order
    pub fn enabled_metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|metric| match metric {
                Metric::Cpu => self.track_cpu,
                Metric::Memory => self.track_memory,
            })
            .collect()
    }
}
