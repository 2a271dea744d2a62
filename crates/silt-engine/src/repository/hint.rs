//! Hint bundle persistence.
//!
//! Bundles are derived state; they are retained only so the newest one
//! can be surfaced after compaction and inspected by operators.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::types::HintBundle;

pub(crate) struct HintRepository;

impl HintRepository {
    pub(crate) fn insert(conn: &Connection, bundle: &HintBundle) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO hint_bundles (generated_at, payload) VALUES (?1, ?2)",
            params![bundle.generated_at, serde_json::to_string(bundle)?],
        )?;
        Ok(())
    }

    /// The most recently recorded bundle, if any.
    pub(crate) fn latest(conn: &Connection) -> Result<Option<HintBundle>> {
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM hint_bundles ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
