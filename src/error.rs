use thiserror::Error;

#[derive(Debug, Error)]
pub enum PacingError {
    #[error("unknown algorithm '{algorithm}' or pattern '{pattern}'")]
    UnknownCatalogEntry { algorithm: String, pattern: String },

    #[error("unknown distribution algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("unknown traffic pattern: {0}")]
    UnknownPattern(String),

    #[error("budget invariant violated: delivered {delivered} exceeds total budget {total_budget}")]
    BudgetInvariantViolated { total_budget: u64, delivered: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PacingError>;
