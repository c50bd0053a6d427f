//! Pure post-processing of generated text.
//!
//! The generator is asked to follow a few literal conventions:
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `**…**` | bold span (contracts only; stripped from copy) |
//! | `[DIVIDER]` | separates the copy options |
//! | `#` | stray markdown header marker, always removed from contracts |
//!
//! Everything here works on plain strings so it can be exercised with
//! literal fixtures, independent of the network call.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const BOLD_MARKER: &str = "**";
pub const COPY_DIVIDER: &str = "[DIVIDER]";
pub const HEADER_MARKER: char = '#';

static BOLD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold-span regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Removes every `**` marker, keeping the enclosed text.
#[must_use]
pub fn strip_bold_markup(text: &str) -> String {
    text.replace(BOLD_MARKER, "")
}

/// Splits generated copy into its options.
///
/// Bold markers are removed first, then the text is split on
/// [`COPY_DIVIDER`]; each option is trimmed and blank options are dropped.
/// Text without a divider yields a single option.
#[must_use]
pub fn split_copy_options(raw: &str) -> Vec<String> {
    strip_bold_markup(raw)
        .split(COPY_DIVIDER)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Removes every `#` and trims the result.
#[must_use]
pub fn strip_header_markers(text: &str) -> String {
    text.replace(HEADER_MARKER, "").trim().to_owned()
}

/// A run of text sharing one weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    #[must_use]
    pub fn normal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    #[must_use]
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// Splits one line into normal and bold spans.
///
/// Paired `**…**` markers become bold spans; an unpaired `**` is dropped.
/// Empty spans are not emitted.
#[must_use]
pub fn bold_spans(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for caps in BOLD_SPAN.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_span(&mut spans, &line[cursor..whole.start()], false);
        push_span(&mut spans, inner.as_str(), true);
        cursor = whole.end();
    }
    push_span(&mut spans, &line[cursor..], false);
    spans
}

fn push_span(spans: &mut Vec<Span>, text: &str, bold: bool) {
    let text = text.replace(BOLD_MARKER, "");
    if !text.is_empty() {
        spans.push(Span { text, bold });
    }
}

/// `true` for an all-caps line longer than five characters, which the
/// contract layout renders as a clause heading.
#[must_use]
pub fn is_heading(line: &str) -> bool {
    let line = line.trim();
    line.chars().count() > 5
        && line.chars().any(char::is_alphabetic)
        && line.to_uppercase() == line
}

/// Lower-cased name with whitespace runs replaced by `_`, for file names.
#[must_use]
pub fn file_slug(name: &str) -> String {
    WHITESPACE_RUN
        .replace_all(name.trim(), "_")
        .to_lowercase()
}

/// Replaces path separators and drive colons with `_` so `name` stays a
/// single path component.
#[must_use]
pub fn safe_file_component(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}
