//! Token estimation

/// Characters per model token used by the estimate
pub const CHARS_PER_TOKEN: usize = 4;

/// Approximate the token count of `text` as `ceil(chars / 4)`
///
/// Good enough to keep requests under the upstream ceiling with margin.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Largest character count whose estimate stays within `tokens`
pub fn char_budget(tokens: usize) -> usize {
    tokens.saturating_mul(CHARS_PER_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_estimate_counts_characters_not_bytes() {
        // 4 CJK characters are 12 bytes in UTF-8
        assert_eq!(estimate_tokens("就業規則"), 1);
    }

    #[test]
    fn test_char_budget_matches_estimate() {
        let text = "x".repeat(char_budget(10));
        assert_eq!(estimate_tokens(&text), 10);
    }
}
