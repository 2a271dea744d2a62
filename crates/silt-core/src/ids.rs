//! Branded ID newtypes for type safety.
//!
//! Task and chunk identifiers are distinct newtype wrappers around
//! `String`, so a task ID can never be passed where a chunk ID is
//! expected. Task IDs are assigned by the host agent's task tool and
//! accepted verbatim; chunk IDs are generated locally as prefixed
//! UUID v7 strings, which are time-ordered and therefore monotonic by
//! creation time.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

branded_id! {
    /// Identifier for a task, externally assigned by the host agent.
    TaskId
}

branded_id! {
    /// Identifier for a context chunk, locally generated.
    ChunkId
}

impl ChunkId {
    /// Generate a new chunk ID (`chunk-` prefixed UUID v7, time-ordered).
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("chunk-{}", Uuid::now_v7()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_ids_are_monotonic_by_generation_order() {
        let a = ChunkId::generate();
        let b = ChunkId::generate();
        assert!(a < b, "{a} should sort before {b}");
    }

    #[test]
    fn task_id_round_trips_through_string() {
        let id = TaskId::from("task-42");
        assert_eq!(id.as_str(), "task-42");
        assert_eq!(id.to_string(), "task-42");
        assert_eq!(id.into_inner(), "task-42");
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = TaskId::from("t1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"t1\"");
        let back: TaskId = serde_json::from_str("\"t1\"").unwrap();
        assert_eq!(back, id);
    }
}
