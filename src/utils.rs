//! Utility functions for text cleaning, time-of-day greetings and log previews.
//!
//! This module provides helper functions used throughout the pipeline:
//! - Headline text normalization ([`clean`])
//! - Greeting and date header computed in a fixed time zone
//! - String truncation for logging

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use tracing::instrument;

/// Maximum number of characters kept from a headline before the ellipsis.
pub const MAX_TITLE_CHARS: usize = 200;

/// Marker appended to truncated headlines.
pub const ELLIPSIS: &str = "...";

/// Normalize scraped headline text.
///
/// Every whitespace character becomes a space, anything outside printable
/// ASCII is dropped, whitespace runs collapse to one space and the ends are
/// trimmed. Results longer than [`MAX_TITLE_CHARS`] are cut and get
/// [`ELLIPSIS`] appended.
///
/// The function is idempotent: `clean(&clean(x)) == clean(x)`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean("  Metro \n line\topens  "), "Metro line opens");
/// assert_eq!(clean("Caf\u{e9} opens"), "Caf opens");
/// ```
pub fn clean(raw: &str) -> String {
    let printable: String = raw
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| (' '..='~').contains(c))
        .collect();
    let collapsed = printable.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.len() > MAX_TITLE_CHARS {
        // Only ASCII survives the filter, so byte and char offsets agree.
        format!("{}{}", &collapsed[..MAX_TITLE_CHARS], ELLIPSIS)
    } else {
        collapsed
    }
}

/// Current time in the zone `offset_minutes` east of UTC.
///
/// Offsets outside +/-24h fall back to UTC.
pub fn now_in_offset(offset_minutes: i32) -> DateTime<FixedOffset> {
    match FixedOffset::east_opt(offset_minutes * 60) {
        Some(offset) => Utc::now().with_timezone(&offset),
        None => Utc::now().fixed_offset(),
    }
}

/// Greeting for the digest header.
///
/// "Good Morning" before noon local time, "Good Evening" otherwise, followed
/// by the recipient's name when one is configured.
#[instrument(level = "debug")]
pub fn greeting(now: &DateTime<FixedOffset>, recipient: &str) -> String {
    let which = if now.hour() < 12 {
        "Good Morning"
    } else {
        "Good Evening"
    };
    let recipient = recipient.trim();
    let greeting = if recipient.is_empty() {
        which.to_string()
    } else {
        format!("{which}, {recipient}")
    };
    tracing::debug!(hour = now.hour(), %greeting, "Computed greeting");
    greeting
}

/// Date line shown under the greeting, e.g. `06 May 2025`.
pub fn date_header(now: &DateTime<FixedOffset>) -> String {
    now.format("%d %B %Y").to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to roughly `max` bytes (on a char boundary) with
/// an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
