//! Shared constants.

/// ID of the synthetic task that owns chunks ingested while no real
/// task was active. It is always `pending` and never completes, which
/// pins its chunks until they are explicitly superseded.
pub const UNTRACKED_TASK_ID: &str = "task-untracked";

/// Subject line for the synthetic untracked task.
pub const UNTRACKED_TASK_SUBJECT: &str = "(untracked context)";

/// Tools whose results can be re-fetched on demand. Re-fetchable chunks
/// are flagged in eviction hints so the summarizer can drop them with
/// less hesitation.
pub const REFETCHABLE_TOOLS: &[&str] = &["Read", "Glob", "Grep", "WebFetch", "WebSearch"];

/// Whether a tool's results are re-fetchable on demand.
#[must_use]
pub fn is_refetchable(tool_name: &str) -> bool {
    REFETCHABLE_TOOLS.contains(&tool_name)
}

/// Longest chunk payload retained, in characters. Fingerprints and
/// token sizes are computed from the full text; only retention is
/// bounded.
pub const MAX_CONTENT_CHARS: usize = 100_000;

/// Clamp text to the retained-payload cap, on a character boundary.
#[must_use]
pub fn clamp_content(text: &str) -> &str {
    match text.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_is_refetchable() {
        assert!(is_refetchable("Read"));
        assert!(is_refetchable("WebSearch"));
    }

    #[test]
    fn bash_is_not_refetchable() {
        assert!(!is_refetchable("Bash"));
        assert!(!is_refetchable(""));
    }

    #[test]
    fn clamp_content_bounds_long_text() {
        let short = "hello";
        assert_eq!(clamp_content(short), short);

        let long = "x".repeat(MAX_CONTENT_CHARS + 17);
        assert_eq!(clamp_content(&long).len(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn clamp_content_respects_char_boundaries() {
        let long = "é".repeat(MAX_CONTENT_CHARS + 3);
        let clamped = clamp_content(&long);
        assert_eq!(clamped.chars().count(), MAX_CONTENT_CHARS);
        assert!(long.is_char_boundary(clamped.len()));
    }
}
