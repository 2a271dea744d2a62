//! Event-dispatching adapter.
//!
//! Bridges host lifecycle events onto the engine services. The adapter
//! is fail-open: a failed trigger must never break the host agent's
//! turn, so [`HookAdapter::dispatch`] catches every error, logs it, and
//! degrades to an empty output.

use serde_json::Value;
use silt_core::TaskStatus;
use silt_engine::{
    ChunkStore, CompactionAdvisor, EvictionEngine, IngestParams, Task, TaskRegistry,
};
use silt_store::Store;
use tracing::{debug, error, info};

use crate::errors::Result;
use crate::events::{
    HookEvent, HookOutput, PreCompactEvent, SessionSource, SessionStartEvent, TaskCreateEvent,
    TaskUpdateEvent, TodoWriteEvent, ToolResultEvent, edited_paths, extract_response_text,
};

/// Tool names the host uses for its task tool.
const TASK_CREATE_TOOL: &str = "TaskCreate";
const TASK_UPDATE_TOOL: &str = "TaskUpdate";
const TODO_WRITE_TOOL: &str = "TodoWrite";
/// Tools whose results invalidate earlier reads of the written file.
const WRITE_TOOLS: &[&str] = &["Edit", "Write", "MultiEdit"];

/// Routes normalized host events to the engine.
#[derive(Clone)]
pub struct HookAdapter {
    registry: TaskRegistry,
    chunks: ChunkStore,
    eviction: EvictionEngine,
    advisor: CompactionAdvisor,
}

impl HookAdapter {
    /// Create an adapter with its own service handles over the store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            registry: TaskRegistry::new(store.clone()),
            chunks: ChunkStore::new(store.clone()),
            eviction: EvictionEngine::new(store.clone()),
            advisor: CompactionAdvisor::new(store),
        }
    }

    /// Handle an event, absorbing any failure into an empty output.
    #[must_use]
    pub fn dispatch(&self, event: &HookEvent) -> HookOutput {
        let result = match event {
            HookEvent::ToolResult(e) => self.handle_tool_result(e),
            HookEvent::PreCompact(e) => self.handle_pre_compact(e),
            HookEvent::SessionStart(e) => self.handle_session_start(e),
        };
        match result {
            Ok(output) => output,
            Err(err) => {
                error!(%err, "hook handling failed, degrading to no-op");
                HookOutput::empty()
            }
        }
    }

    /// Ingest a tool result, routing task-tool calls to the registry
    /// and invalidating stale reads after write tools.
    pub fn handle_tool_result(&self, event: &ToolResultEvent) -> Result<HookOutput> {
        let mut owners = event.active_task_ids.clone();

        // Task-tool calls mutate the registry; their results are also
        // ingested below so the metadata chunk is tracked like any
        // other. Create and start events fire before the host reports
        // the task as active, so the task from the input claims
        // ownership of its own metadata chunk.
        match event.tool_name.as_str() {
            TASK_CREATE_TOOL => {
                let create: TaskCreateEvent =
                    serde_json::from_value(event.tool_input.clone())?;
                let task = self.handle_task_create(&create)?;
                if owners.is_empty() {
                    owners.push(task.id);
                }
            }
            TASK_UPDATE_TOOL => {
                let update: TaskUpdateEvent =
                    serde_json::from_value(event.tool_input.clone())?;
                let _ = self.handle_task_update(&update)?;
                if update.status == TaskStatus::InProgress && owners.is_empty() {
                    owners.push(update.task_id);
                }
            }
            TODO_WRITE_TOOL => {
                let batch: TodoWriteEvent = serde_json::from_value(event.tool_input.clone())?;
                let tasks = self.handle_todo_write(&batch)?;
                if owners.is_empty() {
                    owners.extend(
                        tasks
                            .iter()
                            .filter(|t| t.status == TaskStatus::InProgress)
                            .map(|t| t.id.clone()),
                    );
                }
            }
            _ => {}
        }

        let text = extract_response_text(&event.tool_response);
        if text.is_empty() {
            debug!(tool_name = event.tool_name, "empty tool result, nothing to ingest");
            return Ok(HookOutput::empty());
        }

        let chunk = self.chunks.ingest(IngestParams {
            tool_name: event.tool_name.clone(),
            args: normalized_args(&event.tool_input),
            content: text,
            size_tokens: None,
            active_task_ids: owners,
            session_id: event.session_id.clone(),
        })?;

        if WRITE_TOOLS.contains(&event.tool_name.as_str()) {
            for path in edited_paths(&event.tool_input) {
                let _ = self.chunks.supersede_stale_reads(&path, &chunk.id)?;
            }
        }

        Ok(HookOutput::empty())
    }

    /// Register a newly observed task. Errors surface unchanged.
    pub fn handle_task_create(&self, event: &TaskCreateEvent) -> Result<Task> {
        Ok(self
            .registry
            .create_task(event.task_id.clone(), &event.subject)?)
    }

    /// Apply a task status update. Errors surface unchanged.
    pub fn handle_task_update(&self, event: &TaskUpdateEvent) -> Result<Task> {
        Ok(self.registry.update_status(&event.task_id, event.status)?)
    }

    /// Reconcile a `TodoWrite` batch with the registry: unseen todos
    /// are registered, known ones get their status applied. Entries
    /// without an id are skipped. Returns the resulting records.
    pub fn handle_todo_write(&self, event: &TodoWriteEvent) -> Result<Vec<Task>> {
        let mut tasks = Vec::with_capacity(event.todos.len());
        for todo in &event.todos {
            let Some(id) = &todo.id else {
                debug!(subject = todo.content, "todo without id skipped");
                continue;
            };
            if self.registry.get(id)?.is_none() {
                let _ = self.registry.create_task(id.clone(), &todo.content)?;
            }
            tasks.push(self.registry.update_status(id, todo.status)?);
        }
        Ok(tasks)
    }

    /// Run a final recomputation pass, record the hint bundle, and hand
    /// its guidance text to the summarizer.
    pub fn handle_pre_compact(&self, event: &PreCompactEvent) -> Result<HookOutput> {
        info!(trigger = event.trigger.as_deref(), "compaction imminent, building hints");
        let _ = self.eviction.recompute_all()?;
        let bundle = self.advisor.build_hint_bundle()?;
        self.advisor.record(&bundle)?;
        Ok(HookOutput::with_context(CompactionAdvisor::build_guidance(
            &bundle,
        )))
    }

    /// After compaction, re-inject a summary of still-open work.
    pub fn handle_session_start(&self, event: &SessionStartEvent) -> Result<HookOutput> {
        if event.source != SessionSource::Compact {
            return Ok(HookOutput::empty());
        }
        let summary = self.advisor.build_reinjection_summary()?;
        Ok(HookOutput::with_context(summary))
    }

    /// The registry handle, for consumers wiring richer integrations.
    #[must_use]
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// The chunk store handle.
    #[must_use]
    pub fn chunks(&self) -> &ChunkStore {
        &self.chunks
    }
}

/// Canonicalize the task-id field in task-tool inputs so duplicate
/// detection fingerprints consistently across host versions.
fn normalized_args(input: &Value) -> Value {
    let Value::Object(map) = input else {
        return input.clone();
    };
    let mut map = map.clone();
    if !map.contains_key("task_id") {
        for alias in ["taskId", "id"] {
            if let Some(value) = map.remove(alias) {
                let _ = map.insert("task_id".to_owned(), value);
                break;
            }
        }
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use silt_core::{ChunkStatus, TaskId};

    fn adapter() -> HookAdapter {
        HookAdapter::new(Store::in_memory().unwrap())
    }

    fn tool_result(tool: &str, input: Value, response: Value) -> ToolResultEvent {
        ToolResultEvent {
            tool_name: tool.to_owned(),
            tool_input: input,
            tool_response: response,
            active_task_ids: vec![],
            session_id: Some("sess-1".to_owned()),
        }
    }

    #[test]
    fn task_create_and_update_flow_through_registry() {
        let adapter = adapter();
        let _ = adapter
            .handle_tool_result(&tool_result(
                "TaskCreate",
                json!({"id": "t1", "subject": "ship it"}),
                json!({"text": "created"}),
            ))
            .unwrap();
        let _ = adapter
            .handle_tool_result(&tool_result(
                "TaskUpdate",
                json!({"taskId": "t1", "status": "in_progress"}),
                json!({"text": "updated"}),
            ))
            .unwrap();

        let task = adapter.registry().get(&TaskId::from("t1")).unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.subject, "ship it");
    }

    #[test]
    fn todo_write_batches_drive_the_registry() {
        let adapter = adapter();
        let _ = adapter
            .handle_tool_result(&tool_result(
                "TodoWrite",
                json!({"todos": [
                    {"id": "t1", "content": "first", "status": "in_progress"},
                    {"id": "t2", "content": "second"}
                ]}),
                json!({"text": "ok"}),
            ))
            .unwrap();

        let t1 = adapter.registry().get(&TaskId::from("t1")).unwrap().unwrap();
        assert_eq!(t1.status, TaskStatus::InProgress);
        assert_eq!(t1.subject, "first");
        let t2 = adapter.registry().get(&TaskId::from("t2")).unwrap().unwrap();
        assert_eq!(t2.status, TaskStatus::Pending);

        // A later batch completing t1 releases the metadata chunk the
        // first batch tagged to it.
        let _ = adapter
            .handle_tool_result(&tool_result(
                "TodoWrite",
                json!({"todos": [
                    {"id": "t1", "content": "first", "status": "completed"},
                    {"id": "t2", "content": "second", "status": "in_progress"}
                ]}),
                json!({"text": "ok"}),
            ))
            .unwrap();

        let t1 = adapter.registry().get(&TaskId::from("t1")).unwrap().unwrap();
        assert_eq!(t1.status, TaskStatus::Completed);
        let evictable = adapter.chunks().list_by_status(ChunkStatus::Evictable).unwrap();
        assert_eq!(evictable.len(), 1);
        assert_eq!(evictable[0].tool_name, "TodoWrite");
    }

    #[test]
    fn completing_a_task_releases_its_chunks() {
        let adapter = adapter();
        let _ = adapter
            .handle_tool_result(&tool_result(
                "TaskCreate",
                json!({"id": "t1", "subject": "work"}),
                json!({"text": "ok"}),
            ))
            .unwrap();

        let mut event = tool_result(
            "Bash",
            json!({"cmd": "ls"}),
            json!({"stdout": "file-a\nfile-b", "stderr": ""}),
        );
        event.active_task_ids = vec![TaskId::from("t1")];
        let _ = adapter.handle_tool_result(&event).unwrap();

        let _ = adapter
            .handle_tool_result(&tool_result(
                "TaskUpdate",
                json!({"id": "t1", "status": "completed"}),
                json!({"text": "done"}),
            ))
            .unwrap();

        // Both the Bash result and the TaskCreate metadata chunk were
        // owned by t1, so completion releases them together.
        let evictable = adapter.chunks().list_by_status(ChunkStatus::Evictable).unwrap();
        assert_eq!(evictable.len(), 2);
        assert!(evictable.iter().any(|c| c.tool_name == "Bash"));
        assert!(evictable.iter().any(|c| c.tool_name == "TaskCreate"));
    }

    #[test]
    fn edit_results_invalidate_stale_reads() {
        let adapter = adapter();
        let _ = adapter
            .handle_tool_result(&tool_result(
                "Read",
                json!({"file_path": "/src/lib.rs"}),
                json!({"file": {"filePath": "/src/lib.rs", "content": "fn main() {}"}}),
            ))
            .unwrap();
        let _ = adapter
            .handle_tool_result(&tool_result(
                "Edit",
                json!({"file_path": "/src/lib.rs", "old_string": "a", "new_string": "b"}),
                json!({"filePath": "/src/lib.rs", "newString": "b"}),
            ))
            .unwrap();

        let evictable = adapter.chunks().list_by_status(ChunkStatus::Evictable).unwrap();
        assert_eq!(evictable.len(), 1);
        assert_eq!(evictable[0].tool_name, "Read");
    }

    #[test]
    fn pre_compact_produces_guidance_and_records_bundle() {
        let adapter = adapter();
        let _ = adapter
            .handle_tool_result(&tool_result(
                "TaskCreate",
                json!({"id": "t1", "subject": "research"}),
                json!({"text": "ok"}),
            ))
            .unwrap();
        let mut event = tool_result("Grep", json!({"q": "foo"}), json!({"text": "match"}));
        event.active_task_ids = vec![TaskId::from("t1")];
        let _ = adapter.handle_tool_result(&event).unwrap();
        let _ = adapter
            .handle_tool_result(&tool_result(
                "TaskUpdate",
                json!({"id": "t1", "status": "completed"}),
                json!({"text": "done"}),
            ))
            .unwrap();

        let output = adapter
            .handle_pre_compact(&PreCompactEvent {
                trigger: Some("auto".to_owned()),
                session_id: None,
            })
            .unwrap();
        assert!(output.additional_context.contains("safe to drop"));
    }

    #[test]
    fn session_start_injects_summary_only_after_compaction() {
        let adapter = adapter();
        let startup = adapter
            .handle_session_start(&SessionStartEvent {
                source: SessionSource::Startup,
                session_id: None,
            })
            .unwrap();
        assert!(startup.additional_context.is_empty());

        let resumed = adapter
            .handle_session_start(&SessionStartEvent {
                source: SessionSource::Compact,
                session_id: None,
            })
            .unwrap();
        assert!(resumed.additional_context.contains("No tasks are currently open."));
    }

    #[test]
    fn dispatch_is_fail_open() {
        let adapter = adapter();
        // Unknown task on an explicit update surfaces from the handler
        // but is absorbed by dispatch.
        let event = HookEvent::ToolResult(tool_result(
            "TaskUpdate",
            json!({"id": "missing", "status": "completed"}),
            json!({"text": "x"}),
        ));
        assert_eq!(adapter.dispatch(&event), HookOutput::empty());

        // Malformed payloads are absorbed too.
        let event = HookEvent::ToolResult(tool_result("TaskCreate", json!({}), json!("x")));
        assert_eq!(adapter.dispatch(&event), HookOutput::empty());
    }
}
