// SPDX-License-Identifier: MIT OR Apache-2.0
//! rfd-summary
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Turns a failure's descriptive text into the short, single-line value that
//! front-end log collectors read from the diagnostic response header.
//!
//! The transform is fixed:
//!
//! 1. if the text has a `:` after its first character, and a `.` (again not
//!    the first character) before that `:`, everything up to and including the
//!    last such `.` is dropped, so `org.example.NotFound: gone` becomes
//!    `NotFound: gone`;
//! 2. the result is cut to at most `max_length` characters;
//! 3. every `\n` becomes a space.
//!
//! Lengths and positions count `char`s, and truncation never splits one.

use std::fmt;

/// Default upper bound on a summary's length, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 300;

/// Summarize an optional failure.
///
/// Returns `None` only when `failure` is `None`; any present failure yields a
/// (possibly empty) summary.
pub fn summarize<F>(failure: Option<&F>, max_length: usize) -> Option<String>
where
    F: fmt::Display + ?Sized,
{
    failure.map(|f| summarize_text(&f.to_string(), max_length))
}

/// Summarize a failure's full descriptive text.
pub fn summarize_text(text: &str, max_length: usize) -> String {
    let stripped = strip_namespace(text);
    truncate_chars(stripped, max_length).replace('\n', " ")
}

/// Drop a dotted namespace prefix in front of the first `:`.
fn strip_namespace(text: &str) -> &str {
    let colon = match text.find(':') {
        Some(idx) if idx > 0 => idx,
        _ => return text,
    };
    match text[..colon].rfind('.') {
        // A byte offset is zero exactly when the char offset is.
        Some(dot) if dot > 0 => &text[dot + 1..],
        _ => text,
    }
}

fn truncate_chars(text: &str, max_length: usize) -> &str {
    match text.char_indices().nth(max_length) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}
