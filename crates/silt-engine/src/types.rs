//! Domain records and derived projections.

use serde::{Deserialize, Serialize};
use silt_core::{ChunkId, ChunkStatus, EdgeKind, TaskId, TaskStatus};

/// A task observed from the host agent's task tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Externally assigned identifier.
    pub id: TaskId,
    /// Free-text subject line.
    pub subject: String,
    /// Current workflow status.
    pub status: TaskStatus,
    /// Whether this is the synthetic untracked task.
    pub synthetic: bool,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// ISO-8601 timestamp of first entry into a terminal status.
    pub completed_at: Option<String>,
}

/// A tracked context chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Locally generated, time-ordered identifier.
    pub id: ChunkId,
    /// Name of the tool that produced this chunk.
    pub tool_name: String,
    /// Invoking arguments, as recorded at ingestion.
    pub args: serde_json::Value,
    /// Content hash over `(tool_name, args)`.
    pub args_fingerprint: String,
    /// Opaque payload.
    pub content: String,
    /// Estimated token cost.
    pub size_tokens: u32,
    /// Whether the producing tool can re-fetch this content on demand.
    pub refetchable: bool,
    /// Lifecycle status.
    pub status: ChunkStatus,
    /// Host session this chunk was observed in, when known.
    pub session_id: Option<String>,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// ISO-8601 timestamp of the last status change.
    pub status_changed_at: Option<String>,
}

/// An edge in the append-only task↔chunk reference graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEdge {
    /// Row id (insertion-ordered).
    pub id: i64,
    /// Edge kind.
    pub kind: EdgeKind,
    /// Owning task, for `owner` edges.
    pub task_id: Option<TaskId>,
    /// Superseding chunk, for `supersedes` edges.
    pub src_chunk_id: Option<ChunkId>,
    /// The chunk this edge points at.
    pub chunk_id: ChunkId,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
}

/// Parameters for ingesting a tool result as a chunk.
#[derive(Debug, Clone)]
pub struct IngestParams {
    /// Name of the tool that produced the result.
    pub tool_name: String,
    /// The tool's invoking arguments.
    pub args: serde_json::Value,
    /// The result payload.
    pub content: String,
    /// Token cost, if the host reported one. Estimated from `content`
    /// when absent.
    pub size_tokens: Option<u32>,
    /// Tasks active when the tool call completed. Empty means untracked.
    pub active_task_ids: Vec<TaskId>,
    /// Host session identifier, when known.
    pub session_id: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Hint bundle
// ─────────────────────────────────────────────────────────────────────────────

/// Per-chunk detail for an entry in [`HintBundle::safe_to_evict`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvictableHint {
    /// The evictable chunk.
    pub chunk_id: ChunkId,
    /// Tool that produced it.
    pub tool_name: String,
    /// Estimated token cost reclaimed by dropping it.
    pub size_tokens: u32,
    /// Whether the content can be re-fetched if needed again.
    pub refetchable: bool,
    /// Whether a newer chunk supersedes this one.
    pub superseded: bool,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
}

/// Aggregated view of one still-open task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTaskSummary {
    /// Task identifier.
    pub task_id: TaskId,
    /// Subject line.
    pub subject: String,
    /// Current status.
    pub status: TaskStatus,
    /// Number of non-evicted chunks this task owns.
    pub owned_chunk_count: u32,
    /// Total token cost of those chunks.
    pub owned_size_tokens: u64,
}

/// The hint bundle handed to the downstream summarizer before
/// compaction: what is safe to drop, and what work is still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintBundle {
    /// ISO-8601 generation timestamp.
    pub generated_at: String,
    /// Evictable chunk ids, largest token cost first.
    pub safe_to_evict: Vec<ChunkId>,
    /// Per-chunk detail, in the same order as `safe_to_evict`.
    pub evictable: Vec<EvictableHint>,
    /// Every non-terminal task with its owned-chunk aggregation.
    pub active_tasks_summary: Vec<ActiveTaskSummary>,
    /// Sum of `size_tokens` over `safe_to_evict`.
    pub total_evictable_tokens: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Eviction report
// ─────────────────────────────────────────────────────────────────────────────

/// Why a chunk was collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionReason {
    /// Every owning task reached a terminal status.
    OwnersDone,
    /// A newer chunk with the same tool and arguments replaced it.
    Superseded,
}

impl std::fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OwnersDone => f.write_str("owners done"),
            Self::Superseded => f.write_str("superseded"),
        }
    }
}

/// One chunk collected during a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvictedChunk {
    /// The collected chunk.
    pub chunk_id: ChunkId,
    /// Tool that produced it.
    pub tool_name: String,
    /// Token cost reclaimed.
    pub size_tokens: u32,
    /// Why it was safe to drop.
    pub reason: EvictionReason,
}

/// Outcome of an eviction sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvictionReport {
    /// Chunks transitioned from evictable to evicted.
    pub evicted: Vec<EvictedChunk>,
    /// Total token cost reclaimed.
    pub reclaimed_tokens: u64,
}
