//! Error types for graphbench

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Config error: {0}")]
    Config(#[from] libgraphbench_core::ConfigError),

    #[error("Insertion error: {0}")]
    Insert(#[from] libgraphbench_insert::InsertError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Metrics error: {0}")]
    Metrics(String),
}

impl BenchError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BenchError::Config(_) => 2,
            BenchError::Insert(_) => 3,
            BenchError::Io(_) | BenchError::Json(_) | BenchError::Csv(_) => 4,
            BenchError::Metrics(_) => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
