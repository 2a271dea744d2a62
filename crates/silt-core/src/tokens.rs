//! Token estimation.
//!
//! Chunk sizes are tracked in estimated tokens using the chars/4
//! approximation. Estimates only need to be consistent, not exact:
//! they feed the eviction hint ordering and savings totals.

/// Approximate characters per token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the token cost of a piece of text.
///
/// Never returns zero: even an empty tool result occupies a message
/// envelope in the context window.
#[must_use]
pub fn estimate_tokens(text: &str) -> u32 {
    (text.len().div_ceil(CHARS_PER_TOKEN) as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_costs_one_token() {
        assert_eq!(estimate_tokens(""), 1);
    }

    #[test]
    fn four_chars_per_token() {
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens(&"x".repeat(4000)), 1000);
    }
}
