//! Number and date formatting for reply lines.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

/// Shortens large counts: `950`, `1.2k`, `3.4M`.
pub(crate) fn prettify_suffix(n: u64) -> String {
    match n {
        0..1_000 => n.to_string(),
        1_000..1_000_000 => format!("{:.1}k", n as f64 / 1_000.0),
        _ => format!("{:.1}M", n as f64 / 1_000_000.0),
    }
}

/// Appends `s` unless the count is exactly one.
pub(crate) fn pluralize(n: u64, word: &str) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// `1 commit`, `3 comments`.
pub(crate) fn count(n: u64, word: &str) -> String {
    format!("{n} {}", pluralize(n, word))
}

/// Renders an RFC 3339 timestamp as `2 Jan 2015`.
pub(crate) fn short_date(timestamp: &str) -> Option<String> {
    let parsed = OffsetDateTime::parse(timestamp, &Rfc3339).ok()?;
    parsed
        .format(format_description!("[day padding:none] [month repr:short] [year]"))
        .ok()
}
