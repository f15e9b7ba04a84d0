//! Utility functions and helpers.

pub mod http;

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop whitespace-separated words equal to `token` and normalize whitespace.
pub fn strip_token(s: &str, token: &str) -> String {
    s.split_whitespace()
        .filter(|word| *word != token)
        .collect::<Vec<_>>()
        .join(" ")
}
