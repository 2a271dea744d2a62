//! # silt-store
//!
//! `SQLite`-backed durable store for the silt context-lifecycle system:
//! connection pooling with WAL/foreign-key pragmas, embedded versioned
//! migrations, and the bounded retry policy for contended writes.
//!
//! The store is the only shared mutable resource in the system; every
//! public engine operation runs as one short transaction against it.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod retry;
pub mod store;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection};
pub use errors::{Result, StoreError};
pub use retry::{RetryPolicy, is_busy};
pub use store::Store;
