//! Chunk row persistence.

use rusqlite::{Connection, OptionalExtension, Row, params};
use silt_core::{ChunkId, ChunkStatus};

use crate::errors::Result;
use crate::repository::{invalid_enum, now_iso};
use crate::types::Chunk;

const COLUMNS: &str = "id, tool_name, args, args_fingerprint, content, size_tokens, \
                       refetchable, status, session_id, created_at, status_changed_at";

pub(crate) struct ChunkRepository;

impl ChunkRepository {
    pub(crate) fn insert(conn: &Connection, chunk: &Chunk) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO chunks (id, tool_name, args, args_fingerprint, content, size_tokens,
                                 refetchable, status, session_id, created_at, status_changed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                chunk.id.as_str(),
                chunk.tool_name,
                serde_json::to_string(&chunk.args)?,
                chunk.args_fingerprint,
                chunk.content,
                chunk.size_tokens,
                chunk.refetchable,
                chunk.status.as_sql(),
                chunk.session_id,
                chunk.created_at,
                chunk.status_changed_at,
            ],
        )?;
        Ok(())
    }

    pub(crate) fn get(conn: &Connection, id: &ChunkId) -> Result<Option<Chunk>> {
        let chunk = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM chunks WHERE id = ?1"),
                params![id.as_str()],
                map_row,
            )
            .optional()?;
        Ok(chunk)
    }

    pub(crate) fn set_status(conn: &Connection, id: &ChunkId, status: ChunkStatus) -> Result<()> {
        let _ = conn.execute(
            "UPDATE chunks SET status = ?2, status_changed_at = ?3 WHERE id = ?1",
            params![id.as_str(), status.as_sql(), now_iso()],
        )?;
        Ok(())
    }

    /// Earlier non-evicted chunks with the same `(tool_name,
    /// args_fingerprint)` that no later chunk has already superseded.
    /// Ordered oldest first.
    pub(crate) fn unsuperseded_duplicates(
        conn: &Connection,
        tool_name: &str,
        fingerprint: &str,
    ) -> Result<Vec<Chunk>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM chunks c
             WHERE c.tool_name = ?1
               AND c.args_fingerprint = ?2
               AND c.status != 'evicted'
               AND NOT EXISTS (
                   SELECT 1 FROM reference_edges e
                   WHERE e.kind = 'supersedes' AND e.chunk_id = c.id
               )
             ORDER BY c.id"
        ))?;
        let chunks = stmt
            .query_map(params![tool_name, fingerprint], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(chunks)
    }

    /// Fresh chunks from a re-fetchable read of the given file path,
    /// excluding `exclude`. Used for write-invalidation after an edit.
    pub(crate) fn fresh_reads_of_path(
        conn: &Connection,
        path: &str,
        exclude: &ChunkId,
    ) -> Result<Vec<Chunk>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM chunks
             WHERE tool_name = 'Read'
               AND status = 'fresh'
               AND id != ?2
               AND json_extract(args, '$.file_path') = ?1
             ORDER BY id"
        ))?;
        let chunks = stmt
            .query_map(params![path, exclude.as_str()], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(chunks)
    }

    /// All chunks in the given status, ordered by descending token cost
    /// and then by id for a stable tie-break.
    pub(crate) fn list_by_status(conn: &Connection, status: ChunkStatus) -> Result<Vec<Chunk>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM chunks WHERE status = ?1 ORDER BY size_tokens DESC, id"
        ))?;
        let chunks = stmt
            .query_map(params![status.as_sql()], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(chunks)
    }

    /// Per-status `(count, total tokens)` census over all chunks.
    pub(crate) fn census(conn: &Connection) -> Result<Vec<(ChunkStatus, u32, u64)>> {
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*), COALESCE(SUM(size_tokens), 0)
             FROM chunks GROUP BY status ORDER BY status",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let status: String = row.get(0)?;
                Ok((
                    ChunkStatus::parse(&status)
                        .ok_or_else(|| invalid_enum(0, "chunk status", &status))?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, u64>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Chunk> {
    let args: String = row.get(2)?;
    let status: String = row.get(7)?;
    Ok(Chunk {
        id: ChunkId::from(row.get::<_, String>(0)?),
        tool_name: row.get(1)?,
        args: serde_json::from_str(&args).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        args_fingerprint: row.get(3)?,
        content: row.get(4)?,
        size_tokens: row.get(5)?,
        refetchable: row.get(6)?,
        status: ChunkStatus::parse(&status)
            .ok_or_else(|| invalid_enum(7, "chunk status", &status))?,
        session_id: row.get(8)?,
        created_at: row.get(9)?,
        status_changed_at: row.get(10)?,
    })
}
