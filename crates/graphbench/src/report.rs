//! JSON results report

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use libgraphbench_core::{BenchmarkType, GraphDatabaseType};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::LatencyPercentiles;

/// One database loaded once within a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub scenario: usize,
    pub repetition: i32,
    pub database: GraphDatabaseType,
    pub edges: u64,
    pub vertices: u64,
    pub elapsed_ms: u64,
    pub latencies: LatencyPercentiles,
}

/// Results of one benchmark type across all scenarios and repetitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub benchmark: BenchmarkType,
    pub dataset: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub scenarios: i32,
    pub repetitions: i32,
    pub runs: Vec<RunResult>,
}

impl BenchmarkReport {
    pub fn new(
        benchmark: BenchmarkType,
        dataset: &Path,
        scenarios: i32,
        repetitions: i32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            benchmark,
            dataset: dataset.to_path_buf(),
            started_at,
            finished_at: None,
            scenarios,
            repetitions,
            runs: Vec::new(),
        }
    }

    pub fn push(&mut self, run: RunResult) {
        self.runs.push(run);
    }

    pub fn finish(&mut self, at: DateTime<Utc>) {
        self.finished_at = Some(at);
    }

    /// `massive-insertion-20240131T120000.json` style name
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.json",
            self.benchmark.as_str().to_lowercase().replace('_', "-"),
            self.started_at.format("%Y%m%dT%H%M%S")
        )
    }

    /// Mean load time per database over all its runs
    pub fn mean_elapsed(&self) -> BTreeMap<GraphDatabaseType, Duration> {
        let mut totals: BTreeMap<GraphDatabaseType, (u64, u32)> = BTreeMap::new();
        for run in &self.runs {
            let entry = totals.entry(run.database).or_insert((0, 0));
            entry.0 += run.elapsed_ms;
            entry.1 += 1;
        }
        totals
            .into_iter()
            .map(|(db, (ms, n))| (db, Duration::from_millis(ms / u64::from(n))))
            .collect()
    }

    /// Write the report into `dir`, returning the file path
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}
