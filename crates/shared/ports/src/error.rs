use thiserror::Error;

/// Errors raised while reading rows from an external source
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed row at line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;
