//! Conservative HTML whitespace minification.
//!
//! Whitespace runs are collapsed to a single space, never removed outright:
//! dropping the space entirely can merge adjacent inline content. A final
//! pass guarantees no run of two or more whitespace characters survives.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

/// Collapse whitespace runs in markup to single spaces.
pub fn minify(source: &str) -> String {
    WHITESPACE_RUN.replace_all(source, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_runs_to_single_space() {
        assert_eq!(minify("<p>a</p>\n\n   <p>b</p>"), "<p>a</p> <p>b</p>");
    }

    #[test]
    fn test_preserves_single_spaces() {
        assert_eq!(minify("<b>a</b> <b>b</b>"), "<b>a</b> <b>b</b>");
    }

    #[test]
    fn test_no_double_whitespace_remains() {
        let out = minify("<div>\n\t<span>x</span>  \n</div>");
        assert!(!WHITESPACE_RUN.is_match(&out));
    }
}
