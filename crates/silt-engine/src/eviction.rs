//! Eviction engine.
//!
//! Evictability is a pure function of the reference graph and task
//! state:
//!
//! ```text
//! evictable(c) = all_owners_done(c) AND (NOT has_active_referencer(c) OR is_superseded(c))
//! ```
//!
//! `all_owners_done` looks only at real tasks; the synthetic untracked
//! task never completes, so it is exempt from the owner gate but still
//! counts as an active referencer. An untracked chunk therefore becomes
//! evictable exactly when a newer chunk supersedes it, while a chunk
//! with any open real owner stays fresh regardless of supersession.
//!
//! Recomputation is incremental: a task's terminal transition triggers
//! re-evaluation of its owned chunks only, and supersession triggers
//! re-evaluation of the superseded chunk only. The transition is
//! monotonic (fresh to evictable, never back) and `integrated` chunks
//! are never re-evaluated.

use rusqlite::Connection;
use silt_core::{ChunkId, ChunkStatus, TaskId};
use silt_store::{RetryPolicy, Store, StoreError};
use tracing::{debug, info};

use crate::errors::Result;
use crate::repository::{ChunkRepository, EdgeRepository, TaskRepository};
use crate::txn::with_write_txn;
use crate::types::{EvictedChunk, EvictionReason, EvictionReport};

/// Computes and maintains chunk evictability, and collects evictable
/// chunks on demand.
#[derive(Clone)]
pub struct EvictionEngine {
    store: Store,
    policy: RetryPolicy,
}

impl EvictionEngine {
    /// Create an engine over the given store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            policy: RetryPolicy::default(),
        }
    }

    /// Re-evaluate a single chunk. Returns whether it transitioned to
    /// evictable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] if the chunk does not exist.
    pub fn recompute_chunk(&self, chunk_id: &ChunkId) -> Result<bool> {
        with_write_txn(&self.store, &self.policy, |tx| recompute_chunk(tx, chunk_id))
    }

    /// Re-evaluate every chunk owned by the given task. Returns the
    /// number of chunks that transitioned to evictable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] if the task does not exist.
    pub fn recompute_for_task(&self, task_id: &TaskId) -> Result<u32> {
        with_write_txn(&self.store, &self.policy, |tx| recompute_for_task(tx, task_id))
    }

    /// Re-evaluate every fresh chunk. Incremental triggers keep the
    /// model current on the hot path; this full pass is a safety net
    /// run before compaction. Returns the number of chunks that
    /// transitioned to evictable.
    pub fn recompute_all(&self) -> Result<u32> {
        with_write_txn(&self.store, &self.policy, |tx| {
            let mut flipped = 0;
            for chunk in ChunkRepository::list_by_status(tx, ChunkStatus::Fresh)? {
                if recompute_chunk(tx, &chunk.id)? {
                    flipped += 1;
                }
            }
            Ok(flipped)
        })
    }

    /// Collect every currently evictable chunk: mark each `evicted` and
    /// report what was reclaimed, largest first.
    pub fn sweep(&self) -> Result<EvictionReport> {
        with_write_txn(&self.store, &self.policy, |tx| {
            let evictable = ChunkRepository::list_by_status(tx, ChunkStatus::Evictable)?;
            let mut evicted = Vec::with_capacity(evictable.len());
            let mut reclaimed_tokens = 0u64;

            for chunk in evictable {
                let reason = if EdgeRepository::is_superseded(tx, &chunk.id)? {
                    EvictionReason::Superseded
                } else {
                    EvictionReason::OwnersDone
                };
                ChunkRepository::set_status(tx, &chunk.id, ChunkStatus::Evicted)?;
                reclaimed_tokens += u64::from(chunk.size_tokens);
                evicted.push(EvictedChunk {
                    chunk_id: chunk.id,
                    tool_name: chunk.tool_name,
                    size_tokens: chunk.size_tokens,
                    reason,
                });
            }

            if !evicted.is_empty() {
                info!(
                    chunks = evicted.len(),
                    tokens = reclaimed_tokens,
                    "eviction sweep collected chunks"
                );
            }
            Ok(EvictionReport {
                evicted,
                reclaimed_tokens,
            })
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-transaction recomputation
// ─────────────────────────────────────────────────────────────────────────────

/// Evaluate the predicate for one chunk and flip fresh chunks that now
/// satisfy it. Callers already holding a write transaction use this
/// directly so the recomputation commits atomically with its trigger.
pub(crate) fn recompute_chunk(conn: &Connection, chunk_id: &ChunkId) -> Result<bool> {
    let chunk = ChunkRepository::get(conn, chunk_id)?.ok_or_else(|| {
        StoreError::Integrity(format!("recompute requested for unknown chunk {chunk_id}"))
    })?;

    // Evictable is monotonic and integrated/evicted are terminal, so
    // only fresh chunks are ever re-evaluated.
    if chunk.status != ChunkStatus::Fresh {
        return Ok(false);
    }

    let all_owners_done = EdgeRepository::all_owners_done(conn, chunk_id)?;
    let has_active_referencer = EdgeRepository::has_active_referencer(conn, chunk_id)?;
    let is_superseded = EdgeRepository::is_superseded(conn, chunk_id)?;

    let evictable = all_owners_done && (!has_active_referencer || is_superseded);
    if !evictable {
        return Ok(false);
    }

    ChunkRepository::set_status(conn, chunk_id, ChunkStatus::Evictable)?;
    debug!(
        chunk_id = chunk_id.as_str(),
        superseded = is_superseded,
        "chunk became evictable"
    );
    Ok(true)
}

/// Re-evaluate every chunk owned by a task, bounded by that task's
/// owned-chunk count.
pub(crate) fn recompute_for_task(conn: &Connection, task_id: &TaskId) -> Result<u32> {
    if !TaskRepository::exists(conn, task_id)? {
        return Err(StoreError::Integrity(format!(
            "recompute requested for unknown task {task_id}"
        ))
        .into());
    }

    let mut flipped = 0;
    for chunk_id in EdgeRepository::chunks_owned_by(conn, task_id)? {
        if recompute_chunk(conn, &chunk_id)? {
            flipped += 1;
        }
    }
    Ok(flipped)
}
