//! Argument fingerprinting for supersession detection.
//!
//! Two tool calls are "the same call" when their tool name and
//! canonicalized arguments match. Canonicalization sorts object keys
//! recursively, so `{"a":1,"b":2}` and `{"b":2,"a":1}` fingerprint
//! identically regardless of the order the host serialized them in.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Number of hex characters in a fingerprint (64 bits of the digest).
const FINGERPRINT_LEN: usize = 16;

/// Compute the fingerprint for a `(tool_name, args)` pair.
///
/// Returns a 16-character lowercase hex string.
#[must_use]
pub fn args_fingerprint(tool_name: &str, args: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(tool_name.as_bytes());
    hasher.update(b"::");
    hasher.update(canonical_json(args).as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(FINGERPRINT_LEN);
    for byte in digest.iter().take(FINGERPRINT_LEN / 2) {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Render a JSON value with all object keys sorted, recursively.
fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = String::from("{");
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}:{}", Value::from(key.as_str()), canonical_json(&map[*key]));
            }
            out.push('}');
            out
        }
        Value::Array(items) => {
            let mut out = String::from("[");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&canonical_json(item));
            }
            out.push(']');
            out
        }
        scalar => scalar.to_string(),
    }
}
