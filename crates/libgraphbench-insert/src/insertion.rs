//! Insertion capability and the massive insertion driver
//!
//! Every backend adapter implements [`Insertion`]. The driver streams an
//! edge list through it: both endpoints are resolved with
//! [`Insertion::get_or_create`], the edge is created with
//! [`Insertion::relate_nodes`], and [`Insertion::post`] finalizes the load.

use std::collections::HashSet;
use std::hash::Hash;
use std::time::{Duration, Instant};

use libgraphbench_core::{DatasetSource, Edge};

use crate::error::Result;

/// Capability set of a bulk-insertion adapter
pub trait Insertion {
    /// Backend-specific vertex handle
    type Vertex: Copy + Eq + Hash;

    /// Resolve a dataset token to a vertex, creating it if needed
    fn get_or_create(&mut self, value: &str) -> Result<Self::Vertex>;

    /// Create an edge between two resolved vertices
    fn relate_nodes(&mut self, src: Self::Vertex, dest: Self::Vertex) -> Result<()>;

    /// Finalize the load, flushing anything buffered
    fn post(&mut self) -> Result<()>;
}

/// Outcome of one massive insertion pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionReport {
    pub edges: u64,
    pub vertices: u64,
    pub elapsed: Duration,
}

/// Load every edge from `edges` through `insertion`
///
/// `on_edge` receives the latency of each `relate_nodes` call. Errors from
/// the adapter stop the load and are returned as-is; nothing is retried.
pub fn create_graph<I, E, F>(
    insertion: &mut I,
    edges: E,
    mut on_edge: F,
) -> Result<InsertionReport>
where
    I: Insertion + ?Sized,
    E: IntoIterator<Item = libgraphbench_core::Result<Edge>>,
    F: FnMut(Duration),
{
    let start = Instant::now();
    let mut seen: HashSet<I::Vertex> = HashSet::new();
    let mut count = 0u64;

    for edge in edges {
        let edge = edge?;
        let src = insertion.get_or_create(&edge.source)?;
        let dest = insertion.get_or_create(&edge.target)?;
        seen.insert(src);
        seen.insert(dest);

        let relate_start = Instant::now();
        insertion.relate_nodes(src, dest)?;
        on_edge(relate_start.elapsed());

        count += 1;
        if count % 100_000 == 0 {
            tracing::debug!("inserted {} edges", count);
        }
    }

    insertion.post()?;

    Ok(InsertionReport {
        edges: count,
        vertices: seen.len() as u64,
        elapsed: start.elapsed(),
    })
}

/// Load a whole dataset through `insertion`
pub fn create_graph_from<I, F>(
    insertion: &mut I,
    dataset: &DatasetSource,
    on_edge: F,
) -> Result<InsertionReport>
where
    I: Insertion + ?Sized,
    F: FnMut(Duration),
{
    tracing::info!("loading {} in massive mode", dataset.path().display());
    let report = create_graph(insertion, dataset.edges()?, on_edge)?;
    tracing::info!(
        "loaded {} edges between {} vertices in {:?}",
        report.edges,
        report.vertices,
        report.elapsed
    );
    Ok(report)
}
