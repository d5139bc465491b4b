use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Kinds of benchmark the harness can schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BenchmarkType {
    MassiveInsertion,
    SingleInsertion,
    Deletion,
    FindNeighbours,
    FindNeighboursOfNeighbours,
    FindAdjacentNodes,
    FindShortestPath,
    Clustering,
}

/// A configuration field some benchmark types cannot run without
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    NodesCount,
    RandomizeClustering,
    ActualCommunities,
    /// `cache-values`, or both `cache-values-count` and `cache-increment-factor`
    CacheValueSource,
}

/// Benchmark type to the fields it requires
pub const REQUIREMENTS: [(BenchmarkType, &[RequiredField]); 2] = [
    (
        BenchmarkType::FindNeighboursOfNeighbours,
        &[RequiredField::NodesCount],
    ),
    (
        BenchmarkType::Clustering,
        &[
            RequiredField::NodesCount,
            RequiredField::RandomizeClustering,
            RequiredField::ActualCommunities,
            RequiredField::CacheValueSource,
        ],
    ),
];

impl BenchmarkType {
    pub const ALL: [BenchmarkType; 8] = [
        BenchmarkType::MassiveInsertion,
        BenchmarkType::SingleInsertion,
        BenchmarkType::Deletion,
        BenchmarkType::FindNeighbours,
        BenchmarkType::FindNeighboursOfNeighbours,
        BenchmarkType::FindAdjacentNodes,
        BenchmarkType::FindShortestPath,
        BenchmarkType::Clustering,
    ];

    /// Name as written in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            BenchmarkType::MassiveInsertion => "MASSIVE_INSERTION",
            BenchmarkType::SingleInsertion => "SINGLE_INSERTION",
            BenchmarkType::Deletion => "DELETION",
            BenchmarkType::FindNeighbours => "FIND_NEIGHBOURS",
            BenchmarkType::FindNeighboursOfNeighbours => "FIND_NEIGHBOURS_OF_NEIGHBOURS",
            BenchmarkType::FindAdjacentNodes => "FIND_ADJACENT_NODES",
            BenchmarkType::FindShortestPath => "FIND_SHORTEST_PATH",
            BenchmarkType::Clustering => "CLUSTERING",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BenchmarkType::MassiveInsertion => "Massive Insertion",
            BenchmarkType::SingleInsertion => "Single Insertion",
            BenchmarkType::Deletion => "Delete Graph",
            BenchmarkType::FindNeighbours => "Find Neighbours of All Nodes",
            BenchmarkType::FindNeighboursOfNeighbours => "Find Neighbours of Neighbours",
            BenchmarkType::FindAdjacentNodes => "Find Adjacent Nodes of All Edges",
            BenchmarkType::FindShortestPath => "Find Shortest Path",
            BenchmarkType::Clustering => "Clustering",
        }
    }

    /// Prefix for result files written by this benchmark
    pub fn results_prefix(&self) -> &'static str {
        match self {
            BenchmarkType::MassiveInsertion => "MassiveInsertion",
            BenchmarkType::SingleInsertion => "SingleInsertion",
            BenchmarkType::Deletion => "DeleteGraph",
            BenchmarkType::FindNeighbours => "FindNeighbours",
            BenchmarkType::FindNeighboursOfNeighbours => "FindNeighboursOfNeighbours",
            BenchmarkType::FindAdjacentNodes => "FindAdjacent",
            BenchmarkType::FindShortestPath => "FindShortest",
            BenchmarkType::Clustering => "Clustering",
        }
    }

    /// Fields this benchmark type needs in the configuration
    pub fn required_fields(&self) -> &'static [RequiredField] {
        REQUIREMENTS
            .iter()
            .find(|(ty, _)| ty == self)
            .map(|(_, fields)| *fields)
            .unwrap_or(&[])
    }
}

/// The first selected benchmark type that needs `field`
pub fn requiring(selected: &[BenchmarkType], field: RequiredField) -> Option<BenchmarkType> {
    selected
        .iter()
        .copied()
        .find(|ty| ty.required_fields().contains(&field))
}

impl fmt::Display for BenchmarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BenchmarkType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        BenchmarkType::ALL
            .iter()
            .find(|ty| ty.as_str() == s)
            .copied()
            .ok_or_else(|| ConfigError::UnknownBenchmark(s.to_string()))
    }
}
