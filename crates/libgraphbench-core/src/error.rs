use std::path::PathBuf;

use thiserror::Error;

/// Main error type for configuration and dataset handling
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("configuration must specify {0}")]
    MissingField(String),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("selected database {0} not supported")]
    UnsupportedDatabase(String),

    #[error("unknown benchmark type {0}")]
    UnknownBenchmark(String),

    #[error("{0}")]
    Unsatisfied(String),

    #[error("{0}")]
    Path(String),

    #[error("scenario count overflows for {0} databases")]
    Overflow(usize),

    #[error("IO error while opening file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("dataset error at line {line}: {reason}")]
    Dataset { line: usize, reason: String },

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Get the error code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::InvalidArgs(_) => "invalid_args",
            ConfigError::MissingField(_) => "missing_field",
            ConfigError::InvalidValue { .. } => "invalid_value",
            ConfigError::UnsupportedDatabase(_) => "unsupported_database",
            ConfigError::UnknownBenchmark(_) => "unknown_benchmark",
            ConfigError::Unsatisfied(_) => "missing_field",
            ConfigError::Path(_) => "path_error",
            ConfigError::Overflow(_) => "overflow",
            ConfigError::Open { .. } | ConfigError::Io(_) => "io_error",
            ConfigError::Parse { .. } => "invalid_args",
            ConfigError::Dataset { .. } => "dataset_error",
            ConfigError::TomlParse(_) => "invalid_args",
        }
    }

    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
