//! # silt-core
//!
//! Shared foundation for the silt context-lifecycle system: branded ID
//! newtypes, task/chunk status enums, argument fingerprinting, and token
//! estimation. This crate has no I/O and no database dependency; it is
//! the leaf every other silt crate builds on.

#![deny(unsafe_code)]

pub mod constants;
pub mod fingerprint;
pub mod ids;
pub mod status;
pub mod tokens;

pub use constants::{
    MAX_CONTENT_CHARS, REFETCHABLE_TOOLS, UNTRACKED_TASK_ID, UNTRACKED_TASK_SUBJECT,
    clamp_content, is_refetchable,
};
pub use fingerprint::args_fingerprint;
pub use ids::{ChunkId, TaskId};
pub use status::{ChunkStatus, EdgeKind, TaskStatus};
pub use tokens::{CHARS_PER_TOKEN, estimate_tokens};
