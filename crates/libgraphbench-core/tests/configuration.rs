//! End-to-end tests for building a benchmark configuration
//!
//! Each test writes its dataset files into a temp directory and resolves
//! relative paths against it.

use std::io::Read;
use std::path::Path;

use libgraphbench_core::{
    BenchmarkConfiguration, BenchmarkType, ConfigError, DatasetSource, GraphDatabaseType, Settings,
};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

/// Minimal valid configuration plus extra lines
fn properties(extra: &str) -> String {
    format!(
        "eu.socialsensor.dataset = graph.txt\n\
         eu.socialsensor.database-storage-directory = storage\n\
         eu.socialsensor.permute-benchmarks = false\n\
         eu.socialsensor.results-path = results\n\
         eu.socialsensor.repetitions = 2\n\
         {}",
        extra
    )
}

fn build(dir: &Path, content: &str) -> Result<BenchmarkConfiguration, ConfigError> {
    let settings = Settings::from_properties_str(content).unwrap();
    BenchmarkConfiguration::new_relative_to(&settings, dir)
}

fn clustering_properties(extra: &str) -> String {
    properties(&format!(
        "eu.socialsensor.benchmarks = CLUSTERING\n\
         eu.socialsensor.databases = orient\n\
         eu.socialsensor.nodes-count = 1000\n\
         {}",
        extra
    ))
}

#[test]
fn test_minimal_configuration() {
    let dir = tempdir().unwrap();
    write(dir.path(), "graph.txt", "1 2\n");

    let config = build(
        dir.path(),
        &properties(
            "eu.socialsensor.benchmarks = MASSIVE_INSERTION, FIND_NEIGHBOURS\n\
             eu.socialsensor.databases = orient\n",
        ),
    )
    .unwrap();

    assert_eq!(config.nodes_count(), None);
    assert_eq!(config.repetitions(), 2);
    assert_eq!(
        config.benchmark_types(),
        &[BenchmarkType::MassiveInsertion, BenchmarkType::FindNeighbours]
    );
    assert_eq!(config.db_storage_directory(), Path::new("storage"));
    assert_eq!(config.scenarios(), 1);
    assert!(config.randomized_clustering().is_none());
    assert!(config.actual_communities().is_none());
    assert!(config.cache_values().is_none());
    assert!(!config.publish_csv_metrics());
    assert!(!config.publish_graphite_metrics());
}

#[test]
fn test_toml_and_properties_agree() {
    let dir = tempdir().unwrap();
    write(dir.path(), "graph.txt", "1 2\n");

    let from_props = build(
        dir.path(),
        &properties(
            "eu.socialsensor.benchmarks = MASSIVE_INSERTION\n\
             eu.socialsensor.databases = orient, tbdb\n",
        ),
    )
    .unwrap();

    let toml = Settings::from_toml_str(
        r#"
        [eu.socialsensor]
        dataset = "graph.txt"
        database-storage-directory = "storage"
        permute-benchmarks = false
        results-path = "results"
        repetitions = 2
        benchmarks = ["MASSIVE_INSERTION"]
        databases = ["orient", "tbdb"]
        "#,
    )
    .unwrap();
    let from_toml = BenchmarkConfiguration::new_relative_to(&toml, dir.path()).unwrap();

    assert_eq!(from_props.benchmark_types(), from_toml.benchmark_types());
    assert_eq!(
        from_props.selected_databases().collect::<Vec<_>>(),
        from_toml.selected_databases().collect::<Vec<_>>()
    );
    assert_eq!(from_props.repetitions(), from_toml.repetitions());
}

#[test]
fn test_missing_required_fields() {
    let dir = tempdir().unwrap();
    write(dir.path(), "graph.txt", "1 2\n");
    let full = properties(
        "eu.socialsensor.benchmarks = MASSIVE_INSERTION\n\
         eu.socialsensor.databases = orient\n",
    );

    for key in [
        "dataset",
        "database-storage-directory",
        "permute-benchmarks",
        "results-path",
        "benchmarks",
        "databases",
        "repetitions",
    ] {
        let content: String = full
            .lines()
            .filter(|line| !line.starts_with(&format!("eu.socialsensor.{} ", key)))
            .map(|line| format!("{}\n", line))
            .collect();
        let err = build(dir.path(), &content).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingField(ref k) if k == key),
            "expected missing {}, got {}",
            key,
            err
        );
    }
}

#[test]
fn test_clustering_requires_randomize_flag() {
    let dir = tempdir().unwrap();
    write(dir.path(), "graph.txt", "1 2\n");
    write(dir.path(), "communities.txt", "1 0\n");

    let err = build(
        dir.path(),
        &clustering_properties(
            "eu.socialsensor.actual-communities = communities.txt\n\
             eu.socialsensor.cache-values = 10, 20, 30\n",
        ),
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::Unsatisfied(_)));
    assert!(err.to_string().contains("randomize-clustering"));
}

#[test]
fn test_clustering_requires_cache_source() {
    let dir = tempdir().unwrap();
    write(dir.path(), "graph.txt", "1 2\n");
    write(dir.path(), "communities.txt", "1 0\n");
    let base = "eu.socialsensor.randomize-clustering = false\n\
                eu.socialsensor.actual-communities = communities.txt\n";

    for partial in [
        "",
        "eu.socialsensor.cache-values-count = 5\n",
        "eu.socialsensor.cache-increment-factor = 0.1\n",
    ] {
        let err = build(dir.path(), &clustering_properties(&format!("{}{}", base, partial)))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Unsatisfied(_)), "got {}", err);
        assert_eq!(
            err.to_string(),
            "when doing CW benchmark, must provide cache-values or parameters to generate them"
        );
    }
}

#[test]
fn test_clustering_explicit_cache_values() {
    let dir = tempdir().unwrap();
    write(dir.path(), "graph.txt", "1 2\n");
    write(dir.path(), "communities.txt", "1 0\n");

    let config = build(
        dir.path(),
        &clustering_properties(
            "eu.socialsensor.randomize-clustering = true\n\
             eu.socialsensor.actual-communities = communities.txt\n\
             eu.socialsensor.cache-values = 10, 20, 30\n\
             eu.socialsensor.cache-values-count = 4\n\
             eu.socialsensor.cache-increment-factor = 0.5\n",
        ),
    )
    .unwrap();

    assert_eq!(config.cache_values(), Some(&[10, 20, 30][..]));
    assert_eq!(config.cache_values_count(), None);
    assert_eq!(config.cache_increment_factor(), None);
    assert_eq!(config.randomized_clustering(), Some(true));
    assert_eq!(config.nodes_count(), Some(1000));
    assert_eq!(config.cache_sizes(), Some(vec![10, 20, 30]));
}

#[test]
fn test_clustering_generated_cache_sizes() {
    let dir = tempdir().unwrap();
    write(dir.path(), "graph.txt", "1 2\n");
    write(dir.path(), "communities.txt", "1 0\n");

    let config = build(
        dir.path(),
        &clustering_properties(
            "eu.socialsensor.randomize-clustering = false\n\
             eu.socialsensor.actual-communities = communities.txt\n\
             eu.socialsensor.cache-values-count = 4\n\
             eu.socialsensor.cache-increment-factor = 0.1\n",
        ),
    )
    .unwrap();

    assert_eq!(config.cache_values(), None);
    assert_eq!(config.cache_values_count(), Some(4));
    assert_eq!(config.cache_increment_factor(), Some(0.1));
    assert_eq!(config.cache_sizes(), Some(vec![100, 200, 300, 400]));
}

#[test]
fn test_neighbours_of_neighbours_requires_nodes_count() {
    let dir = tempdir().unwrap();
    write(dir.path(), "graph.txt", "1 2\n");

    let err = build(
        dir.path(),
        &properties(
            "eu.socialsensor.benchmarks = FIND_NEIGHBOURS_OF_NEIGHBOURS\n\
             eu.socialsensor.databases = orient\n",
        ),
    )
    .unwrap_err();
    assert!(err.to_string().contains("nodes-count"));

    let config = build(
        dir.path(),
        &properties(
            "eu.socialsensor.benchmarks = FIND_NEIGHBOURS_OF_NEIGHBOURS\n\
             eu.socialsensor.databases = orient\n\
             eu.socialsensor.nodes-count = 500\n",
        ),
    )
    .unwrap();
    assert_eq!(config.nodes_count(), Some(500));
    assert!(config.cache_values().is_none());
}

#[test]
fn test_split_dataset_concatenates_parts() {
    let dir = tempdir().unwrap();
    write(dir.path(), "foo.dat.1", "1 2\n2 3\n");
    write(dir.path(), "foo.dat.2", "3 4\n");

    let content = properties(
        "eu.socialsensor.benchmarks = MASSIVE_INSERTION\n\
         eu.socialsensor.databases = orient\n",
    )
    .replace("dataset = graph.txt", "dataset = foo.dat");
    let config = build(dir.path(), &content).unwrap();

    assert!(matches!(config.dataset(), DatasetSource::Split { .. }));
    for _ in 0..2 {
        let mut bytes = String::new();
        config.dataset().open().unwrap().read_to_string(&mut bytes).unwrap();
        assert_eq!(bytes, "1 2\n2 3\n3 4\n");
    }
}

#[test]
fn test_missing_dataset_named_in_error() {
    let dir = tempdir().unwrap();
    let err = build(
        dir.path(),
        &properties(
            "eu.socialsensor.benchmarks = MASSIVE_INSERTION\n\
             eu.socialsensor.databases = orient\n",
        ),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "the dataset does not exist");
}

#[test]
fn test_permutation_scenarios() {
    let dir = tempdir().unwrap();
    write(dir.path(), "graph.txt", "1 2\n");
    let dbs = "eu.socialsensor.benchmarks = MASSIVE_INSERTION\n\
               eu.socialsensor.databases = orient, neo4j, sparksee\n";

    let permuted = build(
        dir.path(),
        &properties(dbs).replace("permute-benchmarks = false", "permute-benchmarks = true"),
    )
    .unwrap();
    assert!(permuted.permute_benchmarks());
    assert_eq!(permuted.scenarios(), 6);
    assert_eq!(permuted.database_selection().permutations().len(), 6);

    let single = build(dir.path(), &properties(dbs)).unwrap();
    assert_eq!(single.scenarios(), 1);
    assert_eq!(
        single.selected_databases().collect::<Vec<_>>(),
        vec![
            GraphDatabaseType::OrientDb,
            GraphDatabaseType::Neo4j,
            GraphDatabaseType::Sparksee
        ]
    );
}

#[test]
fn test_unsupported_database() {
    let dir = tempdir().unwrap();
    write(dir.path(), "graph.txt", "1 2\n");

    let err = build(
        dir.path(),
        &properties(
            "eu.socialsensor.benchmarks = MASSIVE_INSERTION\n\
             eu.socialsensor.databases = orient, nosuchdb\n",
        ),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedDatabase(ref name) if name == "nosuchdb"));
    assert!(err.to_string().contains("nosuchdb"));
}

#[test]
fn test_metrics_reporters() {
    let dir = tempdir().unwrap();
    write(dir.path(), "graph.txt", "1 2\n");
    let dbs = "eu.socialsensor.benchmarks = MASSIVE_INSERTION\n\
               eu.socialsensor.databases = orient\n";

    let csv = build(
        dir.path(),
        &properties(&format!("{}eu.socialsensor.metrics.csv.directory = metrics\n", dbs)),
    )
    .unwrap();
    assert!(csv.publish_csv_metrics());
    assert!(!csv.publish_graphite_metrics());
    assert_eq!(csv.csv_reporting_interval(), 1000);

    let graphite = build(
        dir.path(),
        &properties(&format!(
            "{}eu.socialsensor.metrics.graphite.hostname = graphite.local\n\
             eu.socialsensor.metrics.graphite.interval = 5000\n",
            dbs
        )),
    )
    .unwrap();
    assert!(graphite.publish_graphite_metrics());
    assert!(!graphite.publish_csv_metrics());
    assert_eq!(graphite.graphite_hostname(), Some("graphite.local"));
    assert_eq!(graphite.graphite_reporting_interval(), 5000);

    let empty_host = build(
        dir.path(),
        &properties(&format!("{}eu.socialsensor.metrics.graphite.hostname =\n", dbs)),
    )
    .unwrap();
    assert!(!empty_host.publish_graphite_metrics());
}

#[test]
fn test_backend_specific_settings() {
    let dir = tempdir().unwrap();
    write(dir.path(), "graph.txt", "1 2\n");

    let config = build(
        dir.path(),
        &properties(
            "eu.socialsensor.benchmarks = MASSIVE_INSERTION\n\
             eu.socialsensor.databases = orient, sparksee\n\
             eu.socialsensor.orient.lightweight-edges = true\n\
             eu.socialsensor.sparksee.license-key = ABC-123\n\
             eu.socialsensor.shortest-path-random-nodes = 20\n",
        ),
    )
    .unwrap();

    assert_eq!(config.orient_lightweight_edges(), Some(true));
    assert_eq!(config.sparksee_license_key(), Some("ABC-123"));
    assert_eq!(config.random_nodes(), 20);
}

/// Emptying the OrientDB graph before a load must be asked for explicitly
#[test]
fn test_orient_clear_before_load_is_opt_in() {
    let dir = tempdir().unwrap();
    write(dir.path(), "graph.txt", "1 2\n");
    let dbs = "eu.socialsensor.benchmarks = MASSIVE_INSERTION\n\
               eu.socialsensor.databases = orient\n";

    let default = build(dir.path(), &properties(dbs)).unwrap();
    assert!(!default.orient_clear_before_load());
    assert_eq!(default.orient_url(), None);

    let opted_in = build(
        dir.path(),
        &properties(&format!(
            "{}eu.socialsensor.orient.clear-before-load = true\n\
             eu.socialsensor.orient.url = http://admin:admin@db:2480/enron\n",
            dbs
        )),
    )
    .unwrap();
    assert!(opted_in.orient_clear_before_load());
    assert_eq!(opted_in.orient_url(), Some("http://admin:admin@db:2480/enron"));
}
