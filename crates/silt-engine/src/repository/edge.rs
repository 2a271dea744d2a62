//! Reference edge persistence.
//!
//! The graph is append-only. Inserts use `INSERT OR IGNORE` against the
//! edge uniqueness index, so re-tagging the same relationship is a
//! harmless no-op rather than a constraint violation.

use rusqlite::{Connection, Row, params};
use silt_core::{ChunkId, EdgeKind, TaskId};

use crate::errors::Result;
use crate::repository::{invalid_enum, now_iso};
use crate::types::ReferenceEdge;

const COLUMNS: &str = "id, kind, task_id, src_chunk_id, chunk_id, created_at";

pub(crate) struct EdgeRepository;

impl EdgeRepository {
    pub(crate) fn insert_owner(conn: &Connection, task_id: &TaskId, chunk_id: &ChunkId) -> Result<()> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO reference_edges (kind, task_id, chunk_id, created_at)
             VALUES ('owner', ?1, ?2, ?3)",
            params![task_id.as_str(), chunk_id.as_str(), now_iso()],
        )?;
        Ok(())
    }

    pub(crate) fn insert_supersedes(
        conn: &Connection,
        src_chunk_id: &ChunkId,
        chunk_id: &ChunkId,
    ) -> Result<()> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO reference_edges (kind, src_chunk_id, chunk_id, created_at)
             VALUES ('supersedes', ?1, ?2, ?3)",
            params![src_chunk_id.as_str(), chunk_id.as_str(), now_iso()],
        )?;
        Ok(())
    }

    /// Tasks holding an `owner` edge to the chunk.
    pub(crate) fn owners_of(conn: &Connection, chunk_id: &ChunkId) -> Result<Vec<TaskId>> {
        let mut stmt = conn.prepare(
            "SELECT task_id FROM reference_edges
             WHERE kind = 'owner' AND chunk_id = ?1
             ORDER BY task_id",
        )?;
        let ids = stmt
            .query_map(params![chunk_id.as_str()], |row| {
                Ok(TaskId::from(row.get::<_, String>(0)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    /// Older chunks this chunk supersedes.
    pub(crate) fn supersedes_of(conn: &Connection, chunk_id: &ChunkId) -> Result<Vec<ChunkId>> {
        let mut stmt = conn.prepare(
            "SELECT chunk_id FROM reference_edges
             WHERE kind = 'supersedes' AND src_chunk_id = ?1
             ORDER BY chunk_id",
        )?;
        let ids = stmt
            .query_map(params![chunk_id.as_str()], |row| {
                Ok(ChunkId::from(row.get::<_, String>(0)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    /// Newer chunks that supersede this chunk.
    pub(crate) fn superseded_by(conn: &Connection, chunk_id: &ChunkId) -> Result<Vec<ChunkId>> {
        let mut stmt = conn.prepare(
            "SELECT src_chunk_id FROM reference_edges
             WHERE kind = 'supersedes' AND chunk_id = ?1
             ORDER BY src_chunk_id",
        )?;
        let ids = stmt
            .query_map(params![chunk_id.as_str()], |row| {
                Ok(ChunkId::from(row.get::<_, String>(0)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    pub(crate) fn is_superseded(conn: &Connection, chunk_id: &ChunkId) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reference_edges
             WHERE kind = 'supersedes' AND chunk_id = ?1",
            params![chunk_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Whether any owning task is still pending or in progress. The
    /// synthetic untracked task counts as an active referencer.
    pub(crate) fn has_active_referencer(conn: &Connection, chunk_id: &ChunkId) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reference_edges e
             JOIN tasks t ON t.id = e.task_id
             WHERE e.kind = 'owner' AND e.chunk_id = ?1
               AND t.status IN ('pending', 'in_progress')",
            params![chunk_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Whether every real owning task has reached a terminal status.
    /// The synthetic untracked task is excluded: it never completes, so
    /// counting it would make its chunks permanently unevictable even
    /// after supersession.
    pub(crate) fn all_owners_done(conn: &Connection, chunk_id: &ChunkId) -> Result<bool> {
        let open: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reference_edges e
             JOIN tasks t ON t.id = e.task_id
             WHERE e.kind = 'owner' AND e.chunk_id = ?1
               AND t.synthetic = 0
               AND t.status IN ('pending', 'in_progress')",
            params![chunk_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(open == 0)
    }

    /// Chunks owned by the given task, insertion order.
    pub(crate) fn chunks_owned_by(conn: &Connection, task_id: &TaskId) -> Result<Vec<ChunkId>> {
        let mut stmt = conn.prepare(
            "SELECT chunk_id FROM reference_edges
             WHERE kind = 'owner' AND task_id = ?1
             ORDER BY id",
        )?;
        let ids = stmt
            .query_map(params![task_id.as_str()], |row| {
                Ok(ChunkId::from(row.get::<_, String>(0)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    /// `(count, total tokens)` over the task's owned, non-evicted chunks.
    pub(crate) fn owned_aggregate(conn: &Connection, task_id: &TaskId) -> Result<(u32, u64)> {
        let row = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(c.size_tokens), 0)
             FROM reference_edges e
             JOIN chunks c ON c.id = e.chunk_id
             WHERE e.kind = 'owner' AND e.task_id = ?1 AND c.status != 'evicted'",
            params![task_id.as_str()],
            |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u64>(1)?)),
        )?;
        Ok(row)
    }

    /// The full edge log, insertion order.
    pub(crate) fn list_all(conn: &Connection) -> Result<Vec<ReferenceEdge>> {
        let mut stmt =
            conn.prepare(&format!("SELECT {COLUMNS} FROM reference_edges ORDER BY id"))?;
        let edges = stmt
            .query_map([], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<ReferenceEdge> {
    let kind: String = row.get(1)?;
    Ok(ReferenceEdge {
        id: row.get(0)?,
        kind: EdgeKind::parse(&kind).ok_or_else(|| invalid_enum(1, "edge kind", &kind))?,
        task_id: row.get::<_, Option<String>>(2)?.map(TaskId::from),
        src_chunk_id: row.get::<_, Option<String>>(3)?.map(ChunkId::from),
        chunk_id: ChunkId::from(row.get::<_, String>(4)?),
        created_at: row.get(5)?,
    })
}
