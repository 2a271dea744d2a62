//! # silt-hooks
//!
//! Boundary layer between the host agent's lifecycle hooks and the silt
//! engine: normalized event shapes (task-id aliases, per-tool response
//! extraction) and the fail-open [`HookAdapter`] that routes events to
//! the engine services.

#![deny(unsafe_code)]

pub mod adapter;
pub mod errors;
pub mod events;

pub use adapter::HookAdapter;
pub use errors::{HookError, Result};
pub use events::{
    HookEvent, HookOutput, PreCompactEvent, SessionSource, SessionStartEvent, TaskCreateEvent,
    TaskUpdateEvent, ToolResultEvent,
};
