//! Common utilities for FIR generation.
//!
//! Shared helpers for date formatting, Typst escaping and attachment naming.

use std::fmt::Write;

use chrono::{Datelike, Local, NaiveDate};
use sanitize_filename::{sanitize_with_options, Options};

use super::traits::Clock;

/// Wall clock in the server's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Format a date the way Indian English locales print it (e.g. "5/3/2024").
pub fn format_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// Quote and escape a value as a Typst string literal.
///
/// Besides the literal's own delimiters, markup-significant characters are
/// written as unicode escapes so raw `<`, `>`, `&` and `'` never appear in the
/// generated source.
pub fn escape_typst_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str(r"\\"),
            '"' => out.push_str(r#"\""#),
            '\n' => out.push_str(r"\n"),
            '\r' => out.push_str(r"\r"),
            '\t' => out.push_str(r"\t"),
            '<' | '>' | '&' | '\'' => push_unicode_escape(&mut out, ch),
            c if c.is_control() => push_unicode_escape(&mut out, c),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn push_unicode_escape(out: &mut String, ch: char) {
    // Writing to a String cannot fail.
    let _ = write!(out, "\\u{{{:x}}}", ch as u32);
}

/// Longest case-number fragment, in bytes, kept in a filename.
const MAX_CASE_NUMBER_BYTES: usize = 200;

/// Attachment filename for a case, `FIR_{caseNumber}.pdf`.
///
/// Control characters, path separators and reserved characters in the case
/// number are replaced with `-`. The assembled name is sanitized as a whole,
/// so a case number such as `CON` is kept as is.
pub fn attachment_filename(case_number: &str) -> String {
    let mut fragment = String::new();
    for ch in case_number.trim().chars() {
        let ch = if ch.is_control() { '-' } else { ch };
        if fragment.len() + ch.len_utf8() > MAX_CASE_NUMBER_BYTES {
            break;
        }
        fragment.push(ch);
    }
    let fragment = fragment.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if fragment.is_empty() {
        return "FIR.pdf".to_string();
    }

    let options = Options {
        windows: true,
        truncate: true,
        replacement: "-",
    };
    sanitize_with_options(format!("FIR_{fragment}.pdf"), options)
}
