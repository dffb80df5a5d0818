use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config field '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Invalid SQL identifier '{name}'")]
    InvalidIdentifier { name: String },

    #[error("Row has {actual} values, table has {expected} columns")]
    ColumnMismatch { expected: usize, actual: usize },

    #[error("Trend source failed: {reason}")]
    TrendSource { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
