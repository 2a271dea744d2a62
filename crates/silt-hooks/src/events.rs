//! Normalized host lifecycle events.
//!
//! The host agent's hook payloads vary across versions: the task id
//! field appears as `task_id`, `taskId`, or `id`, and tool responses
//! take a different shape per tool. Normalization happens here, at the
//! boundary, so the engine only ever sees canonical shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use silt_core::{TaskId, TaskStatus};

/// A completed tool call reported by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolResultEvent {
    /// Name of the tool that ran.
    pub tool_name: String,
    /// The tool's input arguments.
    #[serde(default)]
    pub tool_input: Value,
    /// The tool's response; structure varies by tool.
    #[serde(default)]
    pub tool_response: Value,
    /// Tasks active when the call completed.
    #[serde(default, alias = "activeTaskIds")]
    pub active_task_ids: Vec<TaskId>,
    /// Host session identifier.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Payload of a `TaskCreate` tool call.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskCreateEvent {
    /// Canonical task id, accepted under any of the host's field names.
    #[serde(alias = "taskId", alias = "id")]
    pub task_id: TaskId,
    /// Subject line.
    #[serde(default, alias = "title")]
    pub subject: String,
}

/// Payload of a `TaskUpdate` tool call.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskUpdateEvent {
    /// Canonical task id, accepted under any of the host's field names.
    #[serde(alias = "taskId", alias = "id")]
    pub task_id: TaskId,
    /// Requested status.
    pub status: TaskStatus,
}

/// One entry in a `TodoWrite` batch.
#[derive(Debug, Clone, Deserialize)]
pub struct TodoItem {
    /// Task id; entries without one are skipped.
    #[serde(default, alias = "taskId", alias = "task_id")]
    pub id: Option<TaskId>,
    /// Requested status. Hosts omit it for freshly created todos.
    #[serde(default = "default_todo_status")]
    pub status: TaskStatus,
    /// Subject line.
    #[serde(default, alias = "subject")]
    pub content: String,
}

fn default_todo_status() -> TaskStatus {
    TaskStatus::Pending
}

/// Payload of a `TodoWrite` tool call: the host's full todo list.
/// Older host versions drive the task registry through this tool
/// instead of `TaskCreate`/`TaskUpdate`.
#[derive(Debug, Clone, Deserialize)]
pub struct TodoWriteEvent {
    /// The todo entries, in host order.
    #[serde(default)]
    pub todos: Vec<TodoItem>,
}

/// Fired just before the host compacts its context window.
#[derive(Debug, Clone, Deserialize)]
pub struct PreCompactEvent {
    /// What initiated compaction (`manual` or `auto`).
    #[serde(default)]
    pub trigger: Option<String>,
    /// Host session identifier.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Why a session is starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSource {
    /// A brand-new session.
    Startup,
    /// The session is resuming after compaction.
    Compact,
    /// Any source this version does not recognize.
    #[serde(other)]
    Other,
}

/// Fired when a host session starts or resumes.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStartEvent {
    /// Why the session is starting.
    pub source: SessionSource,
    /// Host session identifier.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Any lifecycle event the adapter can dispatch.
#[derive(Debug, Clone)]
pub enum HookEvent {
    /// A tool finished running.
    ToolResult(ToolResultEvent),
    /// Compaction is about to run.
    PreCompact(PreCompactEvent),
    /// A session started or resumed.
    SessionStart(SessionStartEvent),
}

/// What a hook handler returns to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    /// Text injected into the host session as additive context.
    pub additional_context: String,
}

impl HookOutput {
    /// An output that injects nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// An output injecting the given context text.
    #[must_use]
    pub fn with_context(text: String) -> Self {
        Self {
            additional_context: text,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response-shape normalization
// ─────────────────────────────────────────────────────────────────────────────

/// Extract a plain-text representation from a tool response. The shape
/// varies by tool: `Read` nests content under `file`, `Bash` reports
/// `stdout`/`stderr`, edit tools report the written file, and anything
/// unrecognized falls back to its JSON rendering.
#[must_use]
pub fn extract_response_text(response: &Value) -> String {
    match response {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(extract_response_text)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => {
            if let Some(Value::Object(file)) = map.get("file") {
                return file
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
            }
            if map.contains_key("stdout") || map.contains_key("stderr") {
                let mut parts = Vec::new();
                for key in ["stdout", "stderr"] {
                    if let Some(text) = map.get(key).and_then(Value::as_str) {
                        if !text.is_empty() {
                            parts.push(text);
                        }
                    }
                }
                return parts.join("\n");
            }
            if let Some(path) = map.get("filePath").and_then(Value::as_str) {
                let written = map
                    .get("newString")
                    .or_else(|| map.get("content"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                return if written.is_empty() {
                    format!("edited:{path}")
                } else {
                    written.to_owned()
                };
            }
            if let Some(text) = map.get("text").and_then(Value::as_str) {
                return text.to_owned();
            }
            response.to_string()
        }
        other => other.to_string(),
    }
}

/// File paths touched by an `Edit`, `Write`, or `MultiEdit` call.
/// `MultiEdit` carries a list of edits, each with its own path.
#[must_use]
pub fn edited_paths(tool_input: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    if let Some(path) = tool_input.get("file_path").and_then(Value::as_str) {
        paths.push(path.to_owned());
    }
    if let Some(edits) = tool_input.get("edits").and_then(Value::as_array) {
        for edit in edits {
            if let Some(path) = edit.get("file_path").and_then(Value::as_str) {
                if !paths.iter().any(|p| p == path) {
                    paths.push(path.to_owned());
                }
            }
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_events_accept_id_aliases() {
        for payload in [
            json!({"task_id": "t1", "subject": "s"}),
            json!({"taskId": "t1", "subject": "s"}),
            json!({"id": "t1", "subject": "s"}),
        ] {
            let event: TaskCreateEvent = serde_json::from_value(payload).unwrap();
            assert_eq!(event.task_id.as_str(), "t1");
        }

        let event: TaskUpdateEvent =
            serde_json::from_value(json!({"taskId": "t2", "status": "in_progress"})).unwrap();
        assert_eq!(event.task_id.as_str(), "t2");
        assert_eq!(event.status, TaskStatus::InProgress);
    }

    #[test]
    fn todo_write_batches_default_to_pending() {
        let event: TodoWriteEvent = serde_json::from_value(json!({
            "todos": [
                {"id": "t1", "content": "first", "status": "in_progress"},
                {"id": "t2", "content": "second"},
                {"content": "no id, skipped downstream"}
            ]
        }))
        .unwrap();

        assert_eq!(event.todos.len(), 3);
        assert_eq!(event.todos[0].status, TaskStatus::InProgress);
        assert_eq!(event.todos[1].status, TaskStatus::Pending);
        assert!(event.todos[2].id.is_none());
    }

    #[test]
    fn session_source_tolerates_unknown_values() {
        let event: SessionStartEvent =
            serde_json::from_value(json!({"source": "compact"})).unwrap();
        assert_eq!(event.source, SessionSource::Compact);

        let event: SessionStartEvent =
            serde_json::from_value(json!({"source": "resume"})).unwrap();
        assert_eq!(event.source, SessionSource::Other);
    }

    #[test]
    fn extract_text_handles_read_shape() {
        let response = json!({"type": "text", "file": {"filePath": "/a", "content": "hello"}});
        assert_eq!(extract_response_text(&response), "hello");
    }

    #[test]
    fn extract_text_joins_bash_streams() {
        let response = json!({"stdout": "out", "stderr": "err", "interrupted": false});
        assert_eq!(extract_response_text(&response), "out\nerr");
        let response = json!({"stdout": "out", "stderr": ""});
        assert_eq!(extract_response_text(&response), "out");
    }

    #[test]
    fn extract_text_handles_edit_shape() {
        let response = json!({"filePath": "/a.rs", "oldString": "x", "newString": "y"});
        assert_eq!(extract_response_text(&response), "y");
        let response = json!({"filePath": "/a.rs"});
        assert_eq!(extract_response_text(&response), "edited:/a.rs");
    }

    #[test]
    fn extract_text_handles_strings_arrays_and_fallback() {
        assert_eq!(extract_response_text(&json!("plain")), "plain");
        assert_eq!(
            extract_response_text(&json!([{"text": "a"}, {"text": "b"}])),
            "a\nb"
        );
        assert_eq!(extract_response_text(&Value::Null), "");
        assert_eq!(extract_response_text(&json!({"weird": 1})), r#"{"weird":1}"#);
    }

    #[test]
    fn edited_paths_covers_multi_edit() {
        let input = json!({
            "file_path": "/a.rs",
            "edits": [
                {"file_path": "/a.rs", "old_string": "x"},
                {"file_path": "/b.rs", "old_string": "y"}
            ]
        });
        assert_eq!(edited_paths(&input), vec!["/a.rs", "/b.rs"]);
        assert!(edited_paths(&json!({})).is_empty());
    }

    #[test]
    fn hook_output_serializes_camel_case() {
        let output = HookOutput::with_context("hi".to_owned());
        assert_eq!(
            serde_json::to_string(&output).unwrap(),
            r#"{"additionalContext":"hi"}"#
        );
    }
}
