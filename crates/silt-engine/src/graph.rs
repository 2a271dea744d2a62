//! Reference graph queries.
//!
//! Read-side projection over the append-only edge log. Edges are
//! written by [`crate::chunks::ChunkStore`] at ingestion; this service
//! only answers liveness and lineage questions about them.

use silt_core::{ChunkId, TaskId};
use silt_store::Store;

use crate::errors::Result;
use crate::repository::EdgeRepository;
use crate::types::ReferenceEdge;

/// Queries over the task↔chunk reference graph.
#[derive(Clone)]
pub struct ReferenceGraph {
    store: Store,
}

impl ReferenceGraph {
    /// Create a graph view over the given store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Tasks owning the chunk.
    pub fn owners_of(&self, chunk_id: &ChunkId) -> Result<Vec<TaskId>> {
        EdgeRepository::owners_of(&*self.store.conn()?, chunk_id)
    }

    /// Older chunks this chunk supersedes.
    pub fn supersedes_of(&self, chunk_id: &ChunkId) -> Result<Vec<ChunkId>> {
        EdgeRepository::supersedes_of(&*self.store.conn()?, chunk_id)
    }

    /// Newer chunks that supersede this chunk.
    pub fn superseded_by(&self, chunk_id: &ChunkId) -> Result<Vec<ChunkId>> {
        EdgeRepository::superseded_by(&*self.store.conn()?, chunk_id)
    }

    /// Whether any owning task is still pending or in progress.
    pub fn has_active_referencer(&self, chunk_id: &ChunkId) -> Result<bool> {
        EdgeRepository::has_active_referencer(&*self.store.conn()?, chunk_id)
    }

    /// Chunks owned by a task, insertion order.
    pub fn chunks_owned_by(&self, task_id: &TaskId) -> Result<Vec<ChunkId>> {
        EdgeRepository::chunks_owned_by(&*self.store.conn()?, task_id)
    }

    /// The full audit log of edges, insertion order.
    pub fn all_edges(&self) -> Result<Vec<ReferenceEdge>> {
        EdgeRepository::list_all(&*self.store.conn()?)
    }
}
