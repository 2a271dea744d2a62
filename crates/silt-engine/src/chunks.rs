//! Context chunk store.
//!
//! Ingests tool results as chunks, tags them to the tasks active at the
//! time, detects supersession by `(tool_name, args_fingerprint)`, and
//! owns the explicit status mutations (`mark_integrated`,
//! `mark_evicted`) exposed to the downstream summarizer.

use silt_core::constants::UNTRACKED_TASK_ID;
use silt_core::{
    ChunkId, ChunkStatus, TaskId, args_fingerprint, clamp_content, estimate_tokens,
    is_refetchable,
};
use silt_store::{RetryPolicy, Store};
use tracing::{debug, info, warn};

use crate::errors::{EngineError, Result};
use crate::eviction;
use crate::repository::{ChunkRepository, EdgeRepository, TaskRepository, now_iso};
use crate::txn::with_write_txn;
use crate::types::{Chunk, IngestParams};

/// Chunk lifecycle operations over the durable store.
#[derive(Clone)]
pub struct ChunkStore {
    store: Store,
    policy: RetryPolicy,
}

impl ChunkStore {
    /// Create a chunk store over the given store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            policy: RetryPolicy::default(),
        }
    }

    /// Ingest a tool result as a fresh chunk.
    ///
    /// The chunk is tagged with an owner edge per distinct active task;
    /// unknown task ids are skipped with a warning, and a chunk left
    /// with no owner falls back to the synthetic untracked task, so
    /// ingestion never fails on a missing task reference. The retained
    /// payload is capped at [`silt_core::MAX_CONTENT_CHARS`]; the
    /// fingerprint and token size still reflect the full text. Earlier
    /// chunks with the same `(tool_name, args)` fingerprint gain a
    /// supersedes edge from the new chunk and are re-evaluated for
    /// eviction immediately.
    pub fn ingest(&self, params: IngestParams) -> Result<Chunk> {
        with_write_txn(&self.store, &self.policy, |tx| {
            TaskRepository::ensure_untracked(tx)?;

            let mut owners: Vec<TaskId> = Vec::new();
            for task_id in &params.active_task_ids {
                if owners.contains(task_id) {
                    continue;
                }
                if TaskRepository::exists(tx, task_id)? {
                    owners.push(task_id.clone());
                } else {
                    warn!(
                        task_id = task_id.as_str(),
                        tool_name = params.tool_name,
                        "ingest referenced unknown task, falling back to untracked"
                    );
                }
            }
            if owners.is_empty() {
                owners.push(TaskId::from(UNTRACKED_TASK_ID));
            }

            let fingerprint = args_fingerprint(&params.tool_name, &params.args);
            let superseded = ChunkRepository::unsuperseded_duplicates(
                tx,
                &params.tool_name,
                &fingerprint,
            )?;

            let chunk = Chunk {
                id: ChunkId::generate(),
                tool_name: params.tool_name.clone(),
                args: params.args.clone(),
                args_fingerprint: fingerprint,
                content: clamp_content(&params.content).to_owned(),
                size_tokens: params
                    .size_tokens
                    .unwrap_or_else(|| estimate_tokens(&params.content)),
                refetchable: is_refetchable(&params.tool_name),
                status: ChunkStatus::Fresh,
                session_id: params.session_id.clone(),
                created_at: now_iso(),
                status_changed_at: None,
            };
            ChunkRepository::insert(tx, &chunk)?;
            for owner in &owners {
                EdgeRepository::insert_owner(tx, owner, &chunk.id)?;
            }

            for old in &superseded {
                EdgeRepository::insert_supersedes(tx, &chunk.id, &old.id)?;
                let _ = eviction::recompute_chunk(tx, &old.id)?;
            }

            debug!(
                chunk_id = chunk.id.as_str(),
                tool_name = chunk.tool_name,
                size_tokens = chunk.size_tokens,
                owners = owners.len(),
                superseded = superseded.len(),
                "chunk ingested"
            );
            Ok(chunk)
        })
    }

    /// Supersede fresh `Read` chunks of a file that has just been
    /// written to. The edit result chunk becomes the superseding source
    /// and the stale reads are re-evaluated immediately.
    pub fn supersede_stale_reads(&self, path: &str, superseding: &ChunkId) -> Result<u32> {
        with_write_txn(&self.store, &self.policy, |tx| {
            let stale = ChunkRepository::fresh_reads_of_path(tx, path, superseding)?;
            for chunk in &stale {
                EdgeRepository::insert_supersedes(tx, superseding, &chunk.id)?;
                let _ = eviction::recompute_chunk(tx, &chunk.id)?;
            }
            if !stale.is_empty() {
                info!(path, count = stale.len(), "stale reads superseded after write");
            }
            Ok(u32::try_from(stale.len()).unwrap_or(u32::MAX))
        })
    }

    /// Pin a chunk verbatim: the summarizer chose to keep its content.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownChunk`] if absent;
    /// [`EngineError::InvalidTransition`] if already evicted.
    pub fn mark_integrated(&self, chunk_id: &ChunkId) -> Result<Chunk> {
        with_write_txn(&self.store, &self.policy, |tx| {
            let chunk = ChunkRepository::get(tx, chunk_id)?
                .ok_or_else(|| EngineError::UnknownChunk(chunk_id.clone()))?;
            match chunk.status {
                ChunkStatus::Integrated => Ok(chunk),
                ChunkStatus::Evicted => Err(EngineError::InvalidTransition {
                    chunk_id: chunk_id.clone(),
                    from: chunk.status,
                    to: ChunkStatus::Integrated,
                }),
                ChunkStatus::Fresh | ChunkStatus::Evictable => {
                    ChunkRepository::set_status(tx, chunk_id, ChunkStatus::Integrated)?;
                    info!(chunk_id = chunk_id.as_str(), "chunk pinned as integrated");
                    Ok(Chunk {
                        status: ChunkStatus::Integrated,
                        ..chunk
                    })
                }
            }
        })
    }

    /// Drop a chunk. Only legal from `evictable`: a chunk must be
    /// proven safe before removal.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownChunk`] if absent;
    /// [`EngineError::InvalidTransition`] from `fresh` or `integrated`.
    pub fn mark_evicted(&self, chunk_id: &ChunkId) -> Result<Chunk> {
        with_write_txn(&self.store, &self.policy, |tx| {
            let chunk = ChunkRepository::get(tx, chunk_id)?
                .ok_or_else(|| EngineError::UnknownChunk(chunk_id.clone()))?;
            match chunk.status {
                ChunkStatus::Evicted => Ok(chunk),
                ChunkStatus::Fresh | ChunkStatus::Integrated => {
                    Err(EngineError::InvalidTransition {
                        chunk_id: chunk_id.clone(),
                        from: chunk.status,
                        to: ChunkStatus::Evicted,
                    })
                }
                ChunkStatus::Evictable => {
                    ChunkRepository::set_status(tx, chunk_id, ChunkStatus::Evicted)?;
                    info!(
                        chunk_id = chunk_id.as_str(),
                        tokens = chunk.size_tokens,
                        "chunk evicted"
                    );
                    Ok(Chunk {
                        status: ChunkStatus::Evicted,
                        ..chunk
                    })
                }
            }
        })
    }

    /// Look up a chunk by id.
    pub fn get(&self, chunk_id: &ChunkId) -> Result<Option<Chunk>> {
        ChunkRepository::get(&*self.store.conn()?, chunk_id)
    }

    /// All chunks in the given status, largest first.
    pub fn list_by_status(&self, status: ChunkStatus) -> Result<Vec<Chunk>> {
        ChunkRepository::list_by_status(&*self.store.conn()?, status)
    }
}
