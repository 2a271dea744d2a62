//! Row-level persistence.
//!
//! Repositories are stateless unit structs operating on a borrowed
//! connection, so a service can compose several of them inside one
//! transaction. All business rules live in the service layer; the
//! repositories only read and write rows.

mod chunk;
mod edge;
mod hint;
mod task;

pub(crate) use chunk::ChunkRepository;
pub(crate) use edge::EdgeRepository;
pub(crate) use hint::HintRepository;
pub(crate) use task::TaskRepository;

use chrono::{SecondsFormat, Utc};

/// Current time as an ISO-8601 string with millisecond precision.
pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Map an unrecognized enum string in a row to a conversion failure.
pub(crate) fn invalid_enum(idx: usize, what: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        format!("unrecognized {what}: {value}").into(),
    )
}
