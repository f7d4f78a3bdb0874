//! Diagnostic extraction: shorten provider free text into a human reason.
//!
//! Providers report non-delivery as SMTP transcripts or prose. A small,
//! ordered table of patterns pulls the interesting part out; the first pattern
//! that matches wins. When nothing matches the raw text is used as-is.

use std::sync::LazyLock;

use regex::Regex;

/// Returned when a bounce-like message carries no diagnostic text at all.
pub const NO_REASON: &str = "No detailed reason provided";

/// Patterns tried in order. Each must have exactly one capture group holding
/// the reason.
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Postfix style: "550 5.1.1 <x@y>: Recipient address rejected: User unknown"
        r"Recipient address rejected: ([^\n]*)",
    ]
    .iter()
    .filter_map(|p| match Regex::new(p) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(pattern = %p, error = %e, "Invalid diagnostic pattern");
            None
        }
    })
    .collect()
});

/// Turn a raw diagnostic into a display reason.
///
/// - empty or whitespace-only input gives [`NO_REASON`];
/// - a matching pattern gives its capture, trimmed;
/// - otherwise the input itself, trimmed.
///
/// The result is never empty.
pub fn extract_reason(detail: &str) -> String {
    let detail = detail.trim();
    if detail.is_empty() {
        return NO_REASON.to_string();
    }

    for re in PATTERNS.iter() {
        if let Some(reason) = re
            .captures(detail)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
        {
            return reason.to_string();
        }
    }

    detail.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_text_up_to_newline() {
        assert_eq!(
            extract_reason("450 4.1.1 Recipient address rejected: mailbox unavailable\nfoo"),
            "mailbox unavailable"
        );
    }

    #[test]
    fn test_extracts_text_up_to_end() {
        assert_eq!(
            extract_reason("550 5.1.1 <a@b.com>: Recipient address rejected: User unknown  "),
            "User unknown"
        );
    }

    #[test]
    fn test_passthrough_without_marker() {
        assert_eq!(extract_reason("general SMTP timeout"), "general SMTP timeout");
        assert_eq!(extract_reason("  spaced out \n"), "spaced out");
    }

    #[test]
    fn test_empty_gives_sentinel() {
        assert_eq!(extract_reason(""), NO_REASON);
        assert_eq!(extract_reason(" \n\t"), NO_REASON);
    }

    #[test]
    fn test_empty_capture_falls_back_to_detail() {
        assert_eq!(
            extract_reason("550 Recipient address rejected: \nmore"),
            "550 Recipient address rejected: \nmore"
        );
    }
}
