//! Task row persistence.

use rusqlite::{Connection, OptionalExtension, Row, params};
use silt_core::constants::{UNTRACKED_TASK_ID, UNTRACKED_TASK_SUBJECT};
use silt_core::{TaskId, TaskStatus};

use crate::errors::Result;
use crate::repository::{invalid_enum, now_iso};
use crate::types::Task;

const COLUMNS: &str = "id, subject, status, synthetic, created_at, completed_at";

pub(crate) struct TaskRepository;

impl TaskRepository {
    pub(crate) fn insert(conn: &Connection, task: &Task) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO tasks (id, subject, status, synthetic, created_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                task.id.as_str(),
                task.subject,
                task.status.as_sql(),
                task.synthetic,
                task.created_at,
                task.completed_at,
            ],
        )?;
        Ok(())
    }

    /// Insert the synthetic untracked task if it is not already present.
    pub(crate) fn ensure_untracked(conn: &Connection) -> Result<()> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO tasks (id, subject, status, synthetic, created_at)
             VALUES (?1, ?2, 'pending', 1, ?3)",
            params![UNTRACKED_TASK_ID, UNTRACKED_TASK_SUBJECT, now_iso()],
        )?;
        Ok(())
    }

    pub(crate) fn get(conn: &Connection, id: &TaskId) -> Result<Option<Task>> {
        let task = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM tasks WHERE id = ?1"),
                params![id.as_str()],
                map_row,
            )
            .optional()?;
        Ok(task)
    }

    pub(crate) fn exists(conn: &Connection, id: &TaskId) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM tasks WHERE id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Update a task's status. `completed_at` is written only when a
    /// value is supplied, and never overwritten once set.
    pub(crate) fn set_status(
        conn: &Connection,
        id: &TaskId,
        status: TaskStatus,
        completed_at: Option<&str>,
    ) -> Result<()> {
        let _ = conn.execute(
            "UPDATE tasks
             SET status = ?2,
                 completed_at = COALESCE(completed_at, ?3)
             WHERE id = ?1",
            params![id.as_str(), status.as_sql(), completed_at],
        )?;
        Ok(())
    }

    /// All real tasks with a non-terminal status, oldest first. The
    /// synthetic untracked task is always pending, so it is excluded
    /// here rather than filtered by every caller.
    pub(crate) fn list_active(conn: &Connection) -> Result<Vec<Task>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE status IN ('pending', 'in_progress') AND synthetic = 0
             ORDER BY created_at, id"
        ))?;
        let tasks = stmt
            .query_map([], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    /// Every task, oldest first.
    pub(crate) fn list_all(conn: &Connection) -> Result<Vec<Task>> {
        let mut stmt =
            conn.prepare(&format!("SELECT {COLUMNS} FROM tasks ORDER BY created_at, id"))?;
        let tasks = stmt
            .query_map([], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    /// Most recently finished real tasks, newest first.
    pub(crate) fn list_recently_finished(conn: &Connection, limit: u32) -> Result<Vec<Task>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE status IN ('completed', 'cancelled') AND synthetic = 0
             ORDER BY completed_at DESC, id DESC
             LIMIT ?1"
        ))?;
        let tasks = stmt
            .query_map(params![limit], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let status: String = row.get(2)?;
    Ok(Task {
        id: TaskId::from(row.get::<_, String>(0)?),
        subject: row.get(1)?,
        status: TaskStatus::parse(&status)
            .ok_or_else(|| invalid_enum(2, "task status", &status))?,
        synthetic: row.get(3)?,
        created_at: row.get(4)?,
        completed_at: row.get(5)?,
    })
}
