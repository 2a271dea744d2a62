//! Error types for the durable store.
//!
//! [`StoreError`] is returned by all store operations. Variants stay
//! specific enough for exhaustive matching by the engine layer, which
//! distinguishes transient contention ([`StoreError::Concurrency`])
//! from corruption ([`StoreError::Integrity`]).

use thiserror::Error;

/// Errors that can occur in the durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// JSON serialization/deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// Write retry budget exhausted on a contended row.
    #[error("write contention persisted after {attempts} attempts")]
    Concurrency {
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// Referential-integrity violation. Indicates a bug in the liveness
    /// model, not a transient condition; always fatal to the operation.
    #[error("integrity violation: {0}")]
    Integrity(String),
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
