pub mod benchmark;
pub mod database;

pub use benchmark::{BenchmarkType, RequiredField};
pub use database::{DatabaseSelection, GraphDatabaseType};
