//! Task registry.
//!
//! Owns the task state machine. Allowed transitions: pending to
//! in_progress, completed, or cancelled; in_progress to completed or
//! cancelled. Anything else (repeating a status, leaving a terminal
//! state) is an idempotent no-op that returns the current record,
//! because the host agent may deliver duplicate update events.
//!
//! A task's first entry into a terminal state triggers eviction
//! recomputation for its owned chunks inside the same transaction, so
//! the liveness model is current before the update call returns.

use silt_core::{TaskId, TaskStatus};
use silt_store::{RetryPolicy, Store};
use tracing::{debug, info};

use crate::errors::{EngineError, Result};
use crate::eviction;
use crate::repository::{TaskRepository, now_iso};
use crate::txn::with_write_txn;
use crate::types::Task;

/// The task state machine over the durable store.
#[derive(Clone)]
pub struct TaskRegistry {
    store: Store,
    policy: RetryPolicy,
}

impl TaskRegistry {
    /// Create a registry over the given store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            policy: RetryPolicy::default(),
        }
    }

    /// Register a newly observed task with status `pending`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateTask`] if the id already exists.
    pub fn create_task(&self, id: TaskId, subject: &str) -> Result<Task> {
        with_write_txn(&self.store, &self.policy, |tx| {
            if TaskRepository::exists(tx, &id)? {
                return Err(EngineError::DuplicateTask(id.clone()));
            }
            let task = Task {
                id: id.clone(),
                subject: subject.to_owned(),
                status: TaskStatus::Pending,
                synthetic: false,
                created_at: now_iso(),
                completed_at: None,
            };
            TaskRepository::insert(tx, &task)?;
            info!(task_id = id.as_str(), subject, "task registered");
            Ok(task)
        })
    }

    /// Apply a status update, returning the resulting record.
    ///
    /// Disallowed transitions are absorbed as no-ops. On a task's first
    /// terminal transition, `completed_at` is set and every chunk the
    /// task owns is re-evaluated for evictability before returning.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownTask`] if the id is absent.
    pub fn update_status(&self, id: &TaskId, next: TaskStatus) -> Result<Task> {
        with_write_txn(&self.store, &self.policy, |tx| {
            let task = TaskRepository::get(tx, id)?
                .ok_or_else(|| EngineError::UnknownTask(id.clone()))?;

            // The synthetic untracked task is frozen pending.
            if task.synthetic || !is_allowed(task.status, next) {
                debug!(
                    task_id = id.as_str(),
                    from = %task.status,
                    to = %next,
                    "status update absorbed as no-op"
                );
                return Ok(task);
            }

            let completed_at = next.is_terminal().then(now_iso);
            TaskRepository::set_status(tx, id, next, completed_at.as_deref())?;
            info!(task_id = id.as_str(), from = %task.status, to = %next, "task status changed");

            if next.is_terminal() {
                let flipped = eviction::recompute_for_task(tx, id)?;
                if flipped > 0 {
                    info!(
                        task_id = id.as_str(),
                        chunks = flipped,
                        "terminal transition released owned chunks"
                    );
                }
            }

            Ok(Task {
                status: next,
                completed_at: completed_at.or(task.completed_at),
                ..task
            })
        })
    }

    /// Look up a task by id.
    pub fn get(&self, id: &TaskId) -> Result<Option<Task>> {
        TaskRepository::get(&*self.store.conn()?, id)
    }

    /// All pending or in-progress real tasks, oldest first. Never
    /// includes the synthetic untracked task.
    pub fn list_active(&self) -> Result<Vec<Task>> {
        TaskRepository::list_active(&*self.store.conn()?)
    }

    /// Every task ever observed, oldest first.
    pub fn list_all(&self) -> Result<Vec<Task>> {
        TaskRepository::list_all(&*self.store.conn()?)
    }
}

fn is_allowed(from: TaskStatus, to: TaskStatus) -> bool {
    matches!(
        (from, to),
        (
            TaskStatus::Pending,
            TaskStatus::InProgress | TaskStatus::Completed | TaskStatus::Cancelled
        ) | (
            TaskStatus::InProgress,
            TaskStatus::Completed | TaskStatus::Cancelled
        )
    )
}
