//! Pipeline configuration loading errors

use blackice_detector::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] ConfigError),
}
