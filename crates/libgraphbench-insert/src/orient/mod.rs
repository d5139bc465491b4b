//! Massive insertion into OrientDB
//!
//! OrientDB bulk loads go through a basic batch-insert session. Before the
//! session opens, a non-transactional graph pre-creates the vertex and edge
//! clusters so the load spreads across them. Vertex ids are supplied by the
//! dataset; the backend never allocates surrogate ids during the load.

pub mod http;

use crate::error::{InsertError, Result};
use crate::insertion::Insertion;

pub use http::HttpOrientClient;

pub const ESTIMATED_ENTRIES: usize = 1_000_000;
pub const AVERAGE_NUMBER_OF_EDGES_PER_NODE: usize = 40;
pub const NUMBER_OF_ORIENT_CLUSTERS: usize = 16;

/// Entry point into an OrientDB deployment
pub trait OrientClient {
    type NoTx: OrientNoTxGraph;
    type Batch: OrientBatchInsert;

    /// Toggle the engine's internal concurrency guard
    fn set_environment_concurrent(&mut self, concurrent: bool);

    /// Open a non-transactional graph on `url`
    fn open_no_tx(&mut self, url: &str) -> Result<Self::NoTx>;

    /// Open a basic batch-insert session on `url`
    fn open_batch(&mut self, url: &str) -> Result<Self::Batch>;
}

/// Schema operations on a non-transactional graph
pub trait OrientNoTxGraph {
    fn add_vertex_cluster(&mut self, name: &str) -> Result<()>;
    fn add_edge_cluster(&mut self, name: &str) -> Result<()>;
    fn shutdown(self) -> Result<()>;
}

/// A basic batch-insert session keyed by caller-supplied vertex ids
pub trait OrientBatchInsert {
    fn set_average_edge_number_per_node(&mut self, edges: usize);
    fn set_estimated_entries(&mut self, entries: usize);
    fn begin(&mut self) -> Result<()>;
    fn create_edge(&mut self, from: i64, to: i64) -> Result<()>;
    fn end(&mut self) -> Result<()>;
}

/// Bulk loader over an OrientDB batch-insert session
pub struct OrientMassiveInsertion<B> {
    graph: B,
}

impl<B: OrientBatchInsert> OrientMassiveInsertion<B> {
    /// Prepare clusters and open the batch session on `url`
    pub fn new<C>(client: &mut C, url: &str) -> Result<Self>
    where
        C: OrientClient<Batch = B>,
    {
        // bulk loads are single threaded
        client.set_environment_concurrent(false);

        let mut no_tx = client.open_no_tx(url)?;
        for i in 0..NUMBER_OF_ORIENT_CLUSTERS {
            no_tx.add_vertex_cluster(&format!("v_{}", i))?;
            no_tx.add_edge_cluster(&format!("e_{}", i))?;
        }
        no_tx.shutdown()?;
        tracing::debug!(
            "created {} vertex and edge clusters on {}",
            NUMBER_OF_ORIENT_CLUSTERS,
            url
        );

        let mut graph = client.open_batch(url)?;
        graph.set_average_edge_number_per_node(AVERAGE_NUMBER_OF_EDGES_PER_NODE);
        graph.set_estimated_entries(ESTIMATED_ENTRIES);
        graph.begin()?;

        Ok(Self { graph })
    }
}

impl<B: OrientBatchInsert> Insertion for OrientMassiveInsertion<B> {
    type Vertex = i64;

    fn get_or_create(&mut self, value: &str) -> Result<i64> {
        value.parse::<i64>().map_err(|source| InsertError::VertexId {
            token: value.to_string(),
            source,
        })
    }

    fn relate_nodes(&mut self, src: i64, dest: i64) -> Result<()> {
        self.graph.create_edge(src, dest)
    }

    fn post(&mut self) -> Result<()> {
        self.graph.end()
    }
}
