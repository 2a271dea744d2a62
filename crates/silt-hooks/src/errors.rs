//! Hook boundary error types.

use silt_engine::EngineError;
use thiserror::Error;

/// Errors surfaced while handling a host lifecycle event.
#[derive(Debug, Error)]
pub enum HookError {
    /// A core engine operation failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The event payload did not match the expected shape.
    #[error("malformed event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Convenience result alias for hook handlers.
pub type Result<T> = std::result::Result<T, HookError>;

#[cfg(test)]
mod tests {
    use super::*;
    use silt_core::TaskId;

    #[test]
    fn engine_errors_convert() {
        let err: HookError = EngineError::UnknownTask(TaskId::from("t1")).into();
        assert_eq!(err.to_string(), "unknown task: t1");
    }

    #[test]
    fn payload_errors_are_labelled() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: HookError = parse_err.into();
        assert!(err.to_string().starts_with("malformed event payload"));
    }
}
