//! Status enums for tasks, chunks, and reference edges.
//!
//! String representations match the SQL CHECK constraint values in the
//! store schema, so `as_sql`/`parse` round-trip through the database.

use serde::{Deserialize, Serialize};

/// Task status in the host agent's workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Observed but not yet started.
    Pending,
    /// Currently being worked on.
    InProgress,
    /// Done. Terminal.
    Completed,
    /// Abandoned. Terminal.
    Cancelled,
}

impl TaskStatus {
    /// Whether this status is terminal (the task will never change again).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether this status keeps owned chunks live.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// SQL string representation (matches the CHECK constraint values).
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a SQL string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Context chunk lifecycle status.
///
/// Transitions: `fresh → evictable` (eviction engine), `evictable →
/// evicted` (garbage collection, irreversible), `fresh | evictable →
/// integrated` (pinned by the downstream summarizer; sticky terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStatus {
    /// Newly ingested, liveness not yet decided.
    Fresh,
    /// Proven safe to drop; awaiting collection.
    Evictable,
    /// Pinned verbatim by the summarizer. Terminal.
    Integrated,
    /// Dropped. Terminal.
    Evicted,
}

impl ChunkStatus {
    /// SQL string representation (matches the CHECK constraint values).
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Evictable => "evictable",
            Self::Integrated => "integrated",
            Self::Evicted => "evicted",
        }
    }

    /// Parse a SQL string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fresh" => Some(Self::Fresh),
            "evictable" => Some(Self::Evictable),
            "integrated" => Some(Self::Integrated),
            "evicted" => Some(Self::Evicted),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChunkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Kind of a reference edge in the task↔chunk graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Task → chunk: the task was active when the chunk was ingested.
    Owner,
    /// Chunk → chunk: a newer chunk makes an older one redundant.
    Supersedes,
}

impl EdgeKind {
    /// SQL string representation.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Supersedes => "supersedes",
        }
    }

    /// Parse a SQL string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Self::Owner),
            "supersedes" => Some(Self::Supersedes),
            _ => None,
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_sql_round_trip() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
        ] {
            assert_eq!(TaskStatus::parse(status.as_sql()), Some(status));
        }
        assert_eq!(TaskStatus::parse("bogus"), None);
    }

    #[test]
    fn chunk_status_sql_round_trip() {
        for status in [
            ChunkStatus::Fresh,
            ChunkStatus::Evictable,
            ChunkStatus::Integrated,
            ChunkStatus::Evicted,
        ] {
            assert_eq!(ChunkStatus::parse(status.as_sql()), Some(status));
        }
        assert_eq!(ChunkStatus::parse(""), None);
    }

    #[test]
    fn terminal_and_active_are_disjoint() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
        ] {
            assert_ne!(status.is_terminal(), status.is_active());
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let back: ChunkStatus = serde_json::from_str("\"evictable\"").unwrap();
        assert_eq!(back, ChunkStatus::Evictable);
    }

    #[test]
    fn edge_kind_sql_round_trip() {
        assert_eq!(EdgeKind::parse("owner"), Some(EdgeKind::Owner));
        assert_eq!(EdgeKind::parse("supersedes"), Some(EdgeKind::Supersedes));
        assert_eq!(EdgeKind::parse("cited"), None);
    }
}
