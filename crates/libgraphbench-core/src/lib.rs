//! Core library for graphbench
//!
//! Configuration loading and validation, the graph database and benchmark
//! type registries, and the dataset locator shared by the insertion drivers
//! and the benchmark runner.

pub mod config;
pub mod dataset;
pub mod error;
pub mod settings;
pub mod types;

pub use config::{BenchmarkConfiguration, CacheValues, MetricsSettings, TitanTuning};
pub use dataset::{validate_readable_file_stream, DatasetSource, Edge, EdgeListReader};
pub use error::{ConfigError, Result};
pub use settings::Settings;
pub use types::{BenchmarkType, DatabaseSelection, GraphDatabaseType, RequiredField};
