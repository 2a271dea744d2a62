//! Compaction advisor.
//!
//! Read-side projection for the host's summarizer: before compaction it
//! assembles the hint bundle (what is safe to drop, what work is still
//! open); after compaction it composes a re-injection summary of the
//! still-live state. It never mutates task or chunk status; acting on
//! the hints is the consumer's job via `mark_evicted`/`mark_integrated`.

use std::fmt::Write as _;

use rusqlite::Connection;
use silt_store::{RetryPolicy, Store};
use tracing::info;

use crate::errors::Result;
use crate::repository::{
    ChunkRepository, EdgeRepository, HintRepository, TaskRepository, now_iso,
};
use crate::txn::with_write_txn;
use crate::types::{ActiveTaskSummary, EvictableHint, HintBundle};

/// Evictable chunks named in the guidance text before it elides.
const GUIDANCE_CHUNK_CAP: usize = 20;
/// Finished tasks listed in the re-injection summary.
const RECENT_FINISHED_LIMIT: u32 = 5;

/// Builds hint bundles and post-compaction summaries.
#[derive(Clone)]
pub struct CompactionAdvisor {
    store: Store,
    policy: RetryPolicy,
}

impl CompactionAdvisor {
    /// Create an advisor over the given store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            policy: RetryPolicy::default(),
        }
    }

    /// Assemble the current hint bundle. Pure read; deterministic for a
    /// given store state apart from `generated_at`.
    pub fn build_hint_bundle(&self) -> Result<HintBundle> {
        let conn = self.store.conn()?;
        build_bundle(&conn)
    }

    /// Persist a generated bundle so it can be inspected later and
    /// surfaced after compaction.
    pub fn record(&self, bundle: &HintBundle) -> Result<()> {
        with_write_txn(&self.store, &self.policy, |tx| {
            HintRepository::insert(tx, bundle)?;
            Ok(())
        })?;
        info!(
            evictable = bundle.safe_to_evict.len(),
            tokens = bundle.total_evictable_tokens,
            "hint bundle recorded"
        );
        Ok(())
    }

    /// The most recently recorded bundle, if any.
    pub fn latest(&self) -> Result<Option<HintBundle>> {
        HintRepository::latest(&*self.store.conn()?)
    }

    /// Human-readable guidance derived from a bundle, handed to the
    /// summarizer alongside the structured artifact.
    #[must_use]
    pub fn build_guidance(bundle: &HintBundle) -> String {
        let mut text = String::new();
        if bundle.safe_to_evict.is_empty() {
            text.push_str("No chunks are currently safe to evict.\n");
        } else {
            let _ = writeln!(
                text,
                "{} chunk(s) totalling ~{} tokens are safe to drop:",
                bundle.safe_to_evict.len(),
                bundle.total_evictable_tokens
            );
            for hint in bundle.evictable.iter().take(GUIDANCE_CHUNK_CAP) {
                let mut traits = vec![format!("~{} tokens", hint.size_tokens)];
                if hint.refetchable {
                    traits.push("refetchable".to_owned());
                }
                if hint.superseded {
                    traits.push("superseded".to_owned());
                }
                let _ = writeln!(
                    text,
                    "- {} from {} ({})",
                    hint.chunk_id,
                    hint.tool_name,
                    traits.join(", ")
                );
            }
            let hidden = bundle.evictable.len().saturating_sub(GUIDANCE_CHUNK_CAP);
            if hidden > 0 {
                let _ = writeln!(text, "... and {hidden} more");
            }
        }

        if !bundle.active_tasks_summary.is_empty() {
            text.push_str("Keep context needed by open tasks:\n");
            for task in &bundle.active_tasks_summary {
                let _ = writeln!(
                    text,
                    "- {} ({}, {} chunks, ~{} tokens)",
                    task.subject, task.status, task.owned_chunk_count, task.owned_size_tokens
                );
            }
        }
        text
    }

    /// Compose the additive context handed back to the host after
    /// compaction: still-open work, recent completions, and what the
    /// last hint bundle made reclaimable. Deterministic for a given
    /// store state.
    pub fn build_reinjection_summary(&self) -> Result<String> {
        let conn = self.store.conn()?;
        let active = TaskRepository::list_active(&conn)?;
        let finished = TaskRepository::list_recently_finished(&conn, RECENT_FINISHED_LIMIT)?;
        let census = ChunkRepository::census(&conn)?;
        let last_bundle = HintRepository::latest(&conn)?;

        let mut text = String::new();
        if active.is_empty() {
            text.push_str("No tasks are currently open.\n");
        } else {
            let _ = writeln!(text, "Open tasks ({}):", active.len());
            for task in &active {
                let (count, tokens) = EdgeRepository::owned_aggregate(&conn, &task.id)?;
                let _ = writeln!(
                    text,
                    "- [{}] {} ({} chunks, ~{} tokens still tracked)",
                    task.status, task.subject, count, tokens
                );
            }
        }

        if !finished.is_empty() {
            let _ = writeln!(text, "Recently finished:");
            for task in &finished {
                let _ = writeln!(text, "- [{}] {}", task.status, task.subject);
            }
        }

        if !census.is_empty() {
            let _ = writeln!(text, "Tracked context:");
            for (status, count, tokens) in &census {
                let _ = writeln!(text, "- {status}: {count} chunk(s), ~{tokens} tokens");
            }
        }

        if let Some(bundle) = last_bundle {
            let _ = writeln!(
                text,
                "Last compaction pass flagged ~{} tokens as reclaimable.",
                bundle.total_evictable_tokens
            );
        }
        Ok(text)
    }
}

fn build_bundle(conn: &Connection) -> Result<HintBundle> {
    let evictable_chunks =
        ChunkRepository::list_by_status(conn, silt_core::ChunkStatus::Evictable)?;

    let mut safe_to_evict = Vec::with_capacity(evictable_chunks.len());
    let mut evictable = Vec::with_capacity(evictable_chunks.len());
    let mut total_evictable_tokens = 0u64;
    for chunk in evictable_chunks {
        total_evictable_tokens += u64::from(chunk.size_tokens);
        safe_to_evict.push(chunk.id.clone());
        evictable.push(EvictableHint {
            superseded: EdgeRepository::is_superseded(conn, &chunk.id)?,
            chunk_id: chunk.id,
            tool_name: chunk.tool_name,
            size_tokens: chunk.size_tokens,
            refetchable: chunk.refetchable,
            created_at: chunk.created_at,
        });
    }

    let mut active_tasks_summary = Vec::new();
    for task in TaskRepository::list_active(conn)? {
        let (owned_chunk_count, owned_size_tokens) =
            EdgeRepository::owned_aggregate(conn, &task.id)?;
        active_tasks_summary.push(ActiveTaskSummary {
            task_id: task.id,
            subject: task.subject,
            status: task.status,
            owned_chunk_count,
            owned_size_tokens,
        });
    }

    Ok(HintBundle {
        generated_at: now_iso(),
        safe_to_evict,
        evictable,
        active_tasks_summary,
        total_evictable_tokens,
    })
}
