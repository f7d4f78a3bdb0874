//! Recipient address helpers.
//!
//! The provider hands back bare `user@domain` strings. We never try to fully
//! validate RFC 5322 here; the checks only decide whether an address is worth
//! sending to the deny-list endpoint and whether two addresses are the same.

/// Whether `raw` looks like a deliverable `local@domain` address.
///
/// Surrounding whitespace is ignored. The address must contain exactly one
/// `@` with a non-empty part on each side.
///
/// # Examples
/// - `"user@example.com"` → `true`
/// - `"a@@b.com"` → `false`
/// - `"noat.com"` → `false`
pub fn is_plausible(raw: &str) -> bool {
    let trimmed = raw.trim();
    let mut parts = trimmed.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => !local.is_empty() && !domain.is_empty(),
        _ => false,
    }
}

/// Canonical form used for comparisons: trimmed and lower-cased.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Case-insensitive address equality.
pub fn same_address(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Format for display: `"Display Name <address>"` or just `"address"`.
pub fn format_mailbox(display_name: Option<&str>, address: &str) -> String {
    match display_name.map(str::trim) {
        Some(name) if !name.is_empty() => format!("{name} <{address}>"),
        _ => address.to_string(),
    }
}
