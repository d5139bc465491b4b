//! Benchmark runner - schedules massive insertion over every scenario
//!
//! A scenario is one execution order of the selected databases. Each
//! scenario is repeated `repetitions` times and every database in the order
//! loads the whole dataset once per repetition.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use libgraphbench_core::{
    BenchmarkConfiguration, BenchmarkType, DatasetSource, GraphDatabaseType,
};
use libgraphbench_insert::{massive_insertion_for, supports_massive_insertion, InsertionReport};

use crate::error::Result;
use crate::metrics::{reporters_for, MetricsRegistry};
use crate::report::{BenchmarkReport, RunResult};

/// Loads a dataset into one backend
pub trait MassiveLoader {
    fn supports(&self, db: GraphDatabaseType) -> bool;

    fn load(
        &mut self,
        db: GraphDatabaseType,
        dataset: &DatasetSource,
        on_edge: &mut dyn FnMut(Duration),
    ) -> Result<InsertionReport>;
}

/// Loader backed by the real insertion adapters
pub struct BackendLoader<'a> {
    config: &'a BenchmarkConfiguration,
}

impl<'a> BackendLoader<'a> {
    pub fn new(config: &'a BenchmarkConfiguration) -> Self {
        Self { config }
    }
}

impl MassiveLoader for BackendLoader<'_> {
    fn supports(&self, db: GraphDatabaseType) -> bool {
        supports_massive_insertion(db)
    }

    fn load(
        &mut self,
        db: GraphDatabaseType,
        dataset: &DatasetSource,
        on_edge: &mut dyn FnMut(Duration),
    ) -> Result<InsertionReport> {
        let mut insertion = massive_insertion_for(db, self.config)?;
        Ok(insertion.create_graph(dataset, on_edge)?)
    }
}

/// One planned load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedRun {
    pub scenario: usize,
    pub repetition: i32,
    pub database: GraphDatabaseType,
}

pub struct Runner<'a, L> {
    config: &'a BenchmarkConfiguration,
    loader: L,
}

impl<'a, L: MassiveLoader> Runner<'a, L> {
    pub fn new(config: &'a BenchmarkConfiguration, loader: L) -> Self {
        Self { config, loader }
    }

    /// Every load the massive insertion benchmark would perform, in order
    pub fn plan(&self) -> Vec<PlannedRun> {
        let mut plan = Vec::new();
        let orders = self.config.database_selection().permutations();
        for (scenario, order) in orders.into_iter().enumerate() {
            for repetition in 1..=self.config.repetitions() {
                for &database in &order {
                    if self.loader.supports(database) {
                        plan.push(PlannedRun {
                            scenario,
                            repetition,
                            database,
                        });
                    }
                }
            }
        }
        plan
    }

    /// Run every selected benchmark, returning the reports written
    pub fn run(&mut self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for ty in self.config.benchmark_types() {
            match ty {
                BenchmarkType::MassiveInsertion => {
                    let report = self.massive_insertion()?;
                    let path = report.write(self.config.results_path())?;
                    tracing::info!("wrote {} results to {}", ty.display_name(), path.display());
                    written.push(path);
                }
                other => tracing::warn!(
                    "{} benchmark is not supported, skipping",
                    other.display_name()
                ),
            }
        }
        Ok(written)
    }

    fn massive_insertion(&mut self) -> Result<BenchmarkReport> {
        let ty = BenchmarkType::MassiveInsertion;
        for db in self.config.selected_databases() {
            if self.loader.supports(db) {
                continue;
            }
            match db.titan_backend() {
                Some(backend) => tracing::warn!(
                    "no {} driver for Titan over {}, skipping it",
                    ty.display_name(),
                    backend
                ),
                None => tracing::warn!(
                    "no {} driver for {}, skipping it",
                    ty.display_name(),
                    db.display_name()
                ),
            }
        }

        let mut report = BenchmarkReport::new(
            ty,
            self.config.dataset().path(),
            self.config.scenarios(),
            self.config.repetitions(),
            Utc::now(),
        );

        for planned in self.plan() {
            tracing::info!(
                "{} scenario {} repetition {}: {}",
                ty.display_name(),
                planned.scenario + 1,
                planned.repetition,
                planned.database.display_name()
            );

            let name = format!("{}.{}", ty.results_prefix(), planned.database.short_name());
            let run = format!("s{}.r{}", planned.scenario, planned.repetition);
            let mut registry = MetricsRegistry::new(reporters_for(self.config, &name, &run)?)?;
            if registry.is_reporting() {
                tracing::debug!("publishing {} metrics", name);
            }
            let loaded = self.loader.load(
                planned.database,
                self.config.dataset(),
                &mut |latency| registry.record(latency),
            )?;
            let snapshot = registry.finish();

            report.push(RunResult {
                scenario: planned.scenario,
                repetition: planned.repetition,
                database: planned.database,
                edges: loaded.edges,
                vertices: loaded.vertices,
                elapsed_ms: u64::try_from(loaded.elapsed.as_millis()).unwrap_or(u64::MAX),
                latencies: snapshot.latencies,
            });
        }

        report.finish(Utc::now());
        for (db, mean) in report.mean_elapsed() {
            tracing::info!("{}: mean load time {:?}", db.display_name(), mean);
        }
        Ok(report)
    }
}
