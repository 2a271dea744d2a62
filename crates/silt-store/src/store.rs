//! The [`Store`] handle: a cloneable pool plus migrations-at-open.
//!
//! Every silt component holds a `Store` rather than touching ambient
//! state; all shared bookkeeping lives behind it.

use tracing::info;

use crate::connection::{self, ConnectionConfig, ConnectionPool, PooledConnection};
use crate::errors::Result;
use crate::migrations::run_migrations;

/// Handle to the durable store. Cheap to clone (shares the pool).
#[derive(Clone)]
pub struct Store {
    pool: ConnectionPool,
}

impl Store {
    /// Open (or create) a file-backed store and run pending migrations.
    pub fn open(path: &str) -> Result<Self> {
        let pool = connection::new_file(path, &ConnectionConfig::default())?;
        let store = Self { pool };
        store.migrate()?;
        info!(path, "store opened");
        Ok(store)
    }

    /// Open an in-memory store (single-connection pool, for testing).
    pub fn in_memory() -> Result<Self> {
        let pool = connection::new_in_memory(&ConnectionConfig::default())?;
        let store = Self { pool };
        store.migrate()?;
        Ok(store)
    }

    /// Get a pooled connection.
    pub fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    /// Access the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;
        let _ = run_migrations(&conn)?;
        Ok(())
    }
}
