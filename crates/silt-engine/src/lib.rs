//! # silt-engine
//!
//! Core of the silt context-lifecycle system: the task registry (task
//! state machine), chunk store (ingestion, supersession, explicit
//! status mutations), reference graph (task↔chunk liveness edges),
//! eviction engine (the evictability predicate and its incremental
//! recomputation), and compaction advisor (hint bundles and the
//! post-compaction summary).
//!
//! Each service holds a [`silt_store::Store`] handle; every mutating
//! operation is one short retried write transaction, so concurrent
//! triggers from the host agent linearize per row without any global
//! lock.

#![deny(unsafe_code)]

pub mod advisor;
pub mod chunks;
pub mod errors;
pub mod eviction;
pub mod graph;
pub mod registry;
pub mod types;

mod repository;
mod txn;

pub use advisor::CompactionAdvisor;
pub use chunks::ChunkStore;
pub use errors::{EngineError, Result};
pub use eviction::EvictionEngine;
pub use graph::ReferenceGraph;
pub use registry::TaskRegistry;
pub use types::{
    ActiveTaskSummary, Chunk, EvictableHint, EvictedChunk, EvictionReason, EvictionReport,
    HintBundle, IngestParams, ReferenceEdge, Task,
};
