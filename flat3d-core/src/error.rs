/// Error types shared by the core crate
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Projection parameters that would yield a degenerate matrix
    #[error("invalid projection: {0}")]
    InvalidProjection(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A malformed OBJ statement, with its 1-based line number
    #[error("OBJ parse error on line {line}: {message}")]
    Obj { line: usize, message: String },

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
