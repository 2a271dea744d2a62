//! Write-transaction executor.
//!
//! Every mutating engine operation runs as one short immediate-mode
//! transaction. Immediate mode takes the write lock up front, so a
//! read-evaluate-write cycle can never observe a row that another
//! writer mutates before commit; contention instead surfaces as a busy
//! error, which is retried with bounded exponential backoff.

use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use silt_store::{RetryPolicy, Store, StoreError, is_busy};
use tracing::warn;

use crate::errors::{EngineError, Result};

/// Run `f` inside a retried immediate write transaction.
///
/// Busy errors are retried up to the policy's attempt bound; exhaustion
/// surfaces as [`StoreError::Concurrency`]. All other errors abort the
/// transaction and propagate on the first attempt.
pub(crate) fn with_write_txn<T>(
    store: &Store,
    policy: &RetryPolicy,
    mut f: impl FnMut(&Transaction<'_>) -> Result<T>,
) -> Result<T> {
    let mut conn = store.conn()?;
    let mut attempt = 1;
    loop {
        match run_once(&mut conn, &mut f) {
            Err(err) if busy(&err) => {
                if attempt >= policy.max_attempts {
                    return Err(StoreError::Concurrency {
                        attempts: policy.max_attempts,
                    }
                    .into());
                }
                warn!(attempt, "write transaction contended, retrying");
                std::thread::sleep(Duration::from_millis(policy.delay_for(attempt)));
                attempt += 1;
            }
            result => return result,
        }
    }
}

fn run_once<T>(
    conn: &mut Connection,
    f: &mut impl FnMut(&Transaction<'_>) -> Result<T>,
) -> Result<T> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

fn busy(err: &EngineError) -> bool {
    matches!(err, EngineError::Store(StoreError::Sqlite(e)) if is_busy(e))
}
