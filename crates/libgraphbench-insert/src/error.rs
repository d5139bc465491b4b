use libgraphbench_core::{ConfigError, GraphDatabaseType};
use thiserror::Error;

/// Errors raised while bulk loading a backend
#[derive(Debug, Error)]
pub enum InsertError {
    #[error("invalid vertex id '{token}': {source}")]
    VertexId {
        token: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("no massive insertion driver for {0}")]
    Unsupported(GraphDatabaseType),

    #[error("invalid target url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("backend error: {0}")]
    Backend(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, InsertError>;
