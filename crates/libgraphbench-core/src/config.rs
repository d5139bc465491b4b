//! Benchmark configuration
//!
//! [`BenchmarkConfiguration`] is built once per run from the
//! `eu.socialsensor` namespace of a [`Settings`] tree. Construction performs
//! every check up front: a value either comes back fully resolved or
//! construction fails with an error naming the offending field. Accessors
//! only read resolved state.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::dataset::{validate_readable_file_stream, DatasetSource};
use crate::error::{ConfigError, Result};
use crate::settings::Settings;
use crate::types::benchmark::{requiring, BenchmarkType, RequiredField};
use crate::types::database::{DatabaseSelection, GraphDatabaseType};

/// Namespace holding every benchmark key
pub const ROOT_NAMESPACE: &str = "eu.socialsensor";

// benchmark keys
const DATASET: &str = "dataset";
const DATABASE_STORAGE_DIRECTORY: &str = "database-storage-directory";
const ACTUAL_COMMUNITIES: &str = "actual-communities";
const NODES_COUNT: &str = "nodes-count";
const REPETITIONS: &str = "repetitions";
const RANDOMIZE_CLUSTERING: &str = "randomize-clustering";
const CACHE_VALUES: &str = "cache-values";
const CACHE_INCREMENT_FACTOR: &str = "cache-increment-factor";
const CACHE_VALUES_COUNT: &str = "cache-values-count";
const PERMUTE_BENCHMARKS: &str = "permute-benchmarks";
const RANDOM_NODES: &str = "shortest-path-random-nodes";
const RESULTS_PATH: &str = "results-path";
const BENCHMARKS: &str = "benchmarks";
const DATABASES: &str = "databases";

// backend keys
const ORIENT: &str = "orient";
const LIGHTWEIGHT_EDGES: &str = "lightweight-edges";
const ORIENT_URL: &str = "url";
const CLEAR_BEFORE_LOAD: &str = "clear-before-load";
const SPARKSEE: &str = "sparksee";
const LICENSE_KEY: &str = "license-key";
const TITAN: &str = "titan";
const BUFFER_SIZE: &str = "buffer-size";
const IDS_BLOCKSIZE: &str = "block-size";
const PAGE_SIZE: &str = "page-size";

// metrics keys
const METRICS: &str = "metrics";
const CSV: &str = "csv";
const CSV_DIR: &str = "directory";
const GRAPHITE: &str = "graphite";
const GRAPHITE_HOSTNAME: &str = "hostname";
const GRAPHITE_PORT: &str = "port";
const INTERVAL: &str = "interval";

/// Titan defaults for tuning values the configuration leaves out
pub const DEFAULT_BUFFER_SIZE: i32 = 1024;
pub const DEFAULT_IDS_BLOCK_SIZE: i32 = 10_000;
pub const DEFAULT_PAGE_SIZE: i32 = 100;

pub const DEFAULT_REPORTING_INTERVAL_MS: i64 = 1000;
pub const DEFAULT_GRAPHITE_PORT: u16 = 2003;
pub const DEFAULT_RANDOM_NODES: i32 = 100;

/// Optional metrics reporters
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSettings {
    pub csv_dir: Option<PathBuf>,
    pub csv_interval_ms: i64,
    pub graphite_hostname: Option<String>,
    pub graphite_port: u16,
    pub graphite_interval_ms: i64,
}

impl MetricsSettings {
    pub fn publish_csv(&self) -> bool {
        self.csv_dir.is_some()
    }

    pub fn publish_graphite(&self) -> bool {
        self.graphite_hostname
            .as_deref()
            .is_some_and(|host| !host.is_empty())
    }
}

/// Titan storage tuning, always resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitanTuning {
    pub buffer_size: i32,
    pub ids_block_size: i32,
    pub page_size: i32,
}

impl Default for TitanTuning {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            ids_block_size: DEFAULT_IDS_BLOCK_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Where the clustering benchmark gets its cache sizes from
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValues {
    Explicit(Vec<i32>),
    Generated { count: i32, increment_factor: f64 },
}

/// Validated, immutable configuration for one benchmark run
#[derive(Debug, Clone)]
pub struct BenchmarkConfiguration {
    dataset: DatasetSource,
    benchmark_types: Vec<BenchmarkType>,
    selection: DatabaseSelection,
    results_path: PathBuf,
    db_storage_directory: PathBuf,
    metrics: MetricsSettings,
    titan: TitanTuning,
    orient_lightweight_edges: Option<bool>,
    orient_url: Option<String>,
    orient_clear_before_load: bool,
    sparksee_license_key: Option<String>,
    random_nodes: i32,
    nodes_count: Option<i32>,
    repetitions: i32,
    randomized_clustering: Option<bool>,
    actual_communities: Option<DatasetSource>,
    cache_values: Option<CacheValues>,
}

impl BenchmarkConfiguration {
    /// Build from an optional source; a missing source is an argument error
    pub fn from_source(appconfig: Option<&Settings>) -> Result<Self> {
        let appconfig = appconfig
            .ok_or_else(|| ConfigError::InvalidArgs("appconfig may not be absent".to_string()))?;
        Self::new(appconfig)
    }

    /// Build from settings, resolving `results-path` against the working directory
    pub fn new(appconfig: &Settings) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::new_relative_to(appconfig, &cwd)
    }

    /// Build from settings, resolving relative paths against `base`
    pub fn new_relative_to(appconfig: &Settings, base: &Path) -> Result<Self> {
        let socialsensor = appconfig.subset(ROOT_NAMESPACE);

        let metrics = read_metrics(&socialsensor.subset(METRICS), base)?;

        let orient = socialsensor.subset(ORIENT);
        let orient_lightweight_edges = orient.get_bool(LIGHTWEIGHT_EDGES)?;
        let orient_url = orient.get_string(ORIENT_URL)?;
        let orient_clear_before_load = orient.get_bool(CLEAR_BEFORE_LOAD)?.unwrap_or(false);

        let sparksee_license_key = socialsensor.subset(SPARKSEE).get_string(LICENSE_KEY)?;

        let titan_ns = socialsensor.subset(TITAN);
        let titan = TitanTuning {
            buffer_size: positive(&titan_ns, BUFFER_SIZE)?.unwrap_or(DEFAULT_BUFFER_SIZE),
            ids_block_size: positive(&titan_ns, IDS_BLOCKSIZE)?.unwrap_or(DEFAULT_IDS_BLOCK_SIZE),
            page_size: positive(&titan_ns, PAGE_SIZE)?.unwrap_or(DEFAULT_PAGE_SIZE),
        };

        let db_storage_directory = socialsensor
            .get_string(DATABASE_STORAGE_DIRECTORY)?
            .map(PathBuf::from)
            .ok_or_else(|| missing(DATABASE_STORAGE_DIRECTORY))?;

        let dataset_path = socialsensor
            .get_string(DATASET)?
            .ok_or_else(|| missing(DATASET))?;
        let dataset = validate_readable_file_stream(base.join(dataset_path), DATASET)?;

        let permute = socialsensor
            .get_bool(PERMUTE_BENCHMARKS)?
            .ok_or_else(|| missing(PERMUTE_BENCHMARKS))?;

        let benchmark_types = required_list(&socialsensor, BENCHMARKS)?
            .iter()
            .map(|name| name.parse::<BenchmarkType>())
            .collect::<Result<Vec<_>>>()?;

        let selection =
            DatabaseSelection::select(&required_list(&socialsensor, DATABASES)?, permute)?;

        let results = socialsensor
            .get_string(RESULTS_PATH)?
            .ok_or_else(|| missing(RESULTS_PATH))?;
        let results_path = prepare_results_dir(&base.join(results))?;

        let random_nodes = positive(&socialsensor, RANDOM_NODES)?.unwrap_or(DEFAULT_RANDOM_NODES);

        let nodes_count = match requiring(&benchmark_types, RequiredField::NodesCount) {
            Some(ty) => Some(
                positive(&socialsensor, NODES_COUNT)?
                    .ok_or_else(|| requirement(ty, "nodes-count integer"))?,
            ),
            None => None,
        };

        let repetitions =
            positive(&socialsensor, REPETITIONS)?.ok_or_else(|| missing(REPETITIONS))?;

        let randomized_clustering =
            match requiring(&benchmark_types, RequiredField::RandomizeClustering) {
                Some(ty) => Some(
                    socialsensor
                        .get_bool(RANDOMIZE_CLUSTERING)?
                        .ok_or_else(|| requirement(ty, "randomize-clustering bool"))?,
                ),
                None => None,
            };

        let actual_communities = match requiring(&benchmark_types, RequiredField::ActualCommunities)
        {
            Some(ty) => {
                let path = socialsensor
                    .get_string(ACTUAL_COMMUNITIES)?
                    .ok_or_else(|| requirement(ty, "a file with actual communities"))?;
                Some(validate_readable_file_stream(base.join(path), ACTUAL_COMMUNITIES)?)
            }
            None => None,
        };

        let cache_values = match requiring(&benchmark_types, RequiredField::CacheValueSource) {
            Some(_) => Some(read_cache_values(&socialsensor)?),
            None => None,
        };

        let config = Self {
            dataset,
            benchmark_types,
            selection,
            results_path,
            db_storage_directory,
            metrics,
            titan,
            orient_lightweight_edges,
            orient_url,
            orient_clear_before_load,
            sparksee_license_key,
            random_nodes,
            nodes_count,
            repetitions,
            randomized_clustering,
            actual_communities,
            cache_values,
        };

        tracing::debug!(
            "configuration: {} benchmark(s), {} database(s), {} scenario(s), {} repetition(s)",
            config.benchmark_types.len(),
            config.selection.databases().len(),
            config.selection.scenarios(),
            config.repetitions
        );

        Ok(config)
    }

    pub fn dataset(&self) -> &DatasetSource {
        &self.dataset
    }

    pub fn selected_databases(&self) -> impl Iterator<Item = GraphDatabaseType> + '_ {
        self.selection.databases().iter().copied()
    }

    pub fn database_selection(&self) -> &DatabaseSelection {
        &self.selection
    }

    pub fn db_storage_directory(&self) -> &Path {
        &self.db_storage_directory
    }

    pub fn results_path(&self) -> &Path {
        &self.results_path
    }

    pub fn benchmark_types(&self) -> &[BenchmarkType] {
        &self.benchmark_types
    }

    pub fn randomized_clustering(&self) -> Option<bool> {
        self.randomized_clustering
    }

    pub fn nodes_count(&self) -> Option<i32> {
        self.nodes_count
    }

    pub fn repetitions(&self) -> i32 {
        self.repetitions
    }

    pub fn cache_values(&self) -> Option<&[i32]> {
        match &self.cache_values {
            Some(CacheValues::Explicit(values)) => Some(values),
            _ => None,
        }
    }

    pub fn cache_values_count(&self) -> Option<i32> {
        match &self.cache_values {
            Some(CacheValues::Generated { count, .. }) => Some(*count),
            _ => None,
        }
    }

    pub fn cache_increment_factor(&self) -> Option<f64> {
        match &self.cache_values {
            Some(CacheValues::Generated { increment_factor, .. }) => Some(*increment_factor),
            _ => None,
        }
    }

    /// The cache sizes the clustering benchmark sweeps over
    ///
    /// Generated sizes are multiples of `increment_factor * nodes_count`
    /// (truncated), one per step up to `count`.
    pub fn cache_sizes(&self) -> Option<Vec<i32>> {
        match &self.cache_values {
            None => None,
            Some(CacheValues::Explicit(values)) => Some(values.clone()),
            Some(CacheValues::Generated {
                count,
                increment_factor,
            }) => {
                let nodes = self.nodes_count.unwrap_or(0);
                let step = (increment_factor * f64::from(nodes)) as i32;
                Some((1..=*count).map(|i| step.saturating_mul(i)).collect())
            }
        }
    }

    pub fn actual_communities(&self) -> Option<&DatasetSource> {
        self.actual_communities.as_ref()
    }

    pub fn orient_lightweight_edges(&self) -> Option<bool> {
        self.orient_lightweight_edges
    }

    pub fn orient_url(&self) -> Option<&str> {
        self.orient_url.as_deref()
    }

    /// Whether the OrientDB graph is emptied before each load; off unless configured
    pub fn orient_clear_before_load(&self) -> bool {
        self.orient_clear_before_load
    }

    pub fn sparksee_license_key(&self) -> Option<&str> {
        self.sparksee_license_key.as_deref()
    }

    pub fn permute_benchmarks(&self) -> bool {
        self.selection.permute()
    }

    pub fn scenarios(&self) -> i32 {
        self.selection.scenarios()
    }

    pub fn random_nodes(&self) -> i32 {
        self.random_nodes
    }

    pub fn metrics(&self) -> &MetricsSettings {
        &self.metrics
    }

    pub fn csv_reporting_interval(&self) -> i64 {
        self.metrics.csv_interval_ms
    }

    pub fn graphite_reporting_interval(&self) -> i64 {
        self.metrics.graphite_interval_ms
    }

    pub fn csv_dir(&self) -> Option<&Path> {
        self.metrics.csv_dir.as_deref()
    }

    pub fn graphite_hostname(&self) -> Option<&str> {
        self.metrics.graphite_hostname.as_deref()
    }

    pub fn titan(&self) -> TitanTuning {
        self.titan
    }

    pub fn titan_buffer_size(&self) -> i32 {
        self.titan.buffer_size
    }

    pub fn titan_ids_blocksize(&self) -> i32 {
        self.titan.ids_block_size
    }

    pub fn titan_page_size(&self) -> i32 {
        self.titan.page_size
    }

    pub fn publish_csv_metrics(&self) -> bool {
        self.metrics.publish_csv()
    }

    pub fn publish_graphite_metrics(&self) -> bool {
        self.metrics.publish_graphite()
    }
}

fn missing(key: &str) -> ConfigError {
    ConfigError::MissingField(key.to_string())
}

fn requirement(ty: BenchmarkType, what: &str) -> ConfigError {
    ConfigError::Unsatisfied(format!("the {} benchmark requires {} in config", ty, what))
}

fn required_list(settings: &Settings, key: &str) -> Result<Vec<String>> {
    if !settings.contains_key(key) {
        return Err(missing(key));
    }
    settings.get_list(key)
}

fn positive(settings: &Settings, key: &str) -> Result<Option<i32>> {
    match settings.get_i32(key)? {
        Some(n) if n <= 0 => Err(ConfigError::invalid(key, format!("{} must be positive", n))),
        other => Ok(other),
    }
}

fn interval(settings: &Settings, key: &str) -> Result<Option<i64>> {
    match settings.get_i64(key)? {
        Some(ms) if ms <= 0 => Err(ConfigError::invalid(key, format!("{}ms must be positive", ms))),
        other => Ok(other),
    }
}

fn read_metrics(metrics: &Settings, base: &Path) -> Result<MetricsSettings> {
    let graphite = metrics.subset(GRAPHITE);
    let graphite_hostname = graphite.get_string(GRAPHITE_HOSTNAME)?;
    let graphite_interval_ms =
        interval(&graphite, INTERVAL)?.unwrap_or(DEFAULT_REPORTING_INTERVAL_MS);
    let graphite_port = match graphite.get_i64(GRAPHITE_PORT)? {
        None => DEFAULT_GRAPHITE_PORT,
        Some(port) => u16::try_from(port)
            .map_err(|_| ConfigError::invalid(GRAPHITE_PORT, format!("{} is not a port", port)))?,
    };

    let csv = metrics.subset(CSV);
    let csv_interval_ms = match interval(&csv, INTERVAL)? {
        Some(ms) => ms,
        None => interval(metrics, INTERVAL)?.unwrap_or(DEFAULT_REPORTING_INTERVAL_MS),
    };
    let csv_dir = csv.get_string(CSV_DIR)?.map(|dir| {
        if dir.is_empty() {
            base.to_path_buf()
        } else {
            base.join(dir)
        }
    });

    Ok(MetricsSettings {
        csv_dir,
        csv_interval_ms,
        graphite_hostname,
        graphite_port,
        graphite_interval_ms,
    })
}

fn read_cache_values(socialsensor: &Settings) -> Result<CacheValues> {
    if socialsensor.contains_key(CACHE_VALUES) {
        let values = socialsensor
            .get_list(CACHE_VALUES)?
            .iter()
            .map(|v| {
                v.trim()
                    .parse::<i32>()
                    .map_err(|e| ConfigError::invalid(CACHE_VALUES, format!("'{}': {}", v, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(CacheValues::Explicit(values));
    }

    match (
        positive(socialsensor, CACHE_VALUES_COUNT)?,
        socialsensor.get_f64(CACHE_INCREMENT_FACTOR)?,
    ) {
        (Some(count), Some(increment_factor)) => Ok(CacheValues::Generated {
            count,
            increment_factor,
        }),
        _ => Err(ConfigError::Unsatisfied(
            "when doing CW benchmark, must provide cache-values or parameters to generate them"
                .to_string(),
        )),
    }
}

/// Create the results directory if needed and check it accepts writes
fn prepare_results_dir(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| {
            ConfigError::Path(format!(
                "unable to create results directory {}: {}",
                path.display(),
                e
            ))
        })?;
        tracing::debug!("created results directory {}", path.display());
    }
    if !path.is_dir() {
        return Err(ConfigError::Path(format!(
            "unable to write to results directory {}: not a directory",
            path.display()
        )));
    }

    let marker = path.join(format!(".graphbench-write-check-{}", std::process::id()));
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&marker)
        .map_err(|e| {
            ConfigError::Path(format!(
                "unable to write to results directory {}: {}",
                path.display(),
                e
            ))
        })?;
    let _ = std::fs::remove_file(&marker);

    Ok(path.to_path_buf())
}
