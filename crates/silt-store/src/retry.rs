//! Retry policy for contended writes.
//!
//! Portable, sync-only building blocks: the policy constants, the
//! backoff math, and busy-error classification. The actual
//! read-evaluate-write retry loop lives in the engine layer, which
//! owns the transactions.

use rusqlite::ErrorCode;

/// Default maximum write attempts before surfacing a concurrency error.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Base backoff delay in milliseconds.
pub const BASE_DELAY_MS: u64 = 10;
/// Maximum backoff delay between attempts in milliseconds.
pub const MAX_DELAY_MS: u64 = 250;

/// Retry policy for contended write transactions.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Maximum number of attempts (default: 5).
    pub max_attempts: u32,
    /// Base delay for exponential backoff in ms (default: 10).
    pub base_delay_ms: u64,
    /// Cap on the backoff delay in ms (default: 250).
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: BASE_DELAY_MS,
            max_delay_ms: MAX_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before the given attempt (1-based): exponential,
    /// capped at [`RetryPolicy::max_delay_ms`].
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> u64 {
        let exp = attempt.saturating_sub(1).min(16);
        (self.base_delay_ms << exp).min(self.max_delay_ms)
    }
}

/// Whether a `SQLite` error is transient lock contention worth retrying.
#[must_use]
pub fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::DatabaseBusy || e.code == ErrorCode::DatabaseLocked
    )
}
