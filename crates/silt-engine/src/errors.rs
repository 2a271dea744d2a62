//! Engine error types.

use silt_core::{ChunkId, ChunkStatus, TaskId};
use silt_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the engine's public operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A task with this id already exists.
    #[error("task already exists: {0}")]
    DuplicateTask(TaskId),

    /// No task with this id.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    /// No chunk with this id.
    #[error("unknown chunk: {0}")]
    UnknownChunk(ChunkId),

    /// An illegal chunk status change was attempted.
    #[error("invalid transition for chunk {chunk_id}: {from} -> {to}")]
    InvalidTransition {
        /// The chunk whose transition was rejected.
        chunk_id: ChunkId,
        /// Current status.
        from: ChunkStatus,
        /// Requested status.
        to: ChunkStatus,
    },

    /// Store-level failure (contention, integrity, I/O).
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(StoreError::from(err))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Store(StoreError::from(err))
    }
}

/// Convenience result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
