//! Normalization of raw source lines.
//!
//! Before anything is tokenized, every raw line goes through [`normalize`]:
//! the line ending is dropped, everything from the first `#` onwards is cut
//! off, and surrounding whitespace is trimmed. Lines left without any
//! non-whitespace character are skipped entirely:
//!
//! ```
//! # use ippcode23_parser::lines::normalize;
//! assert_eq!(normalize("DEFVAR GF@x   # counter\n"), Some("DEFVAR GF@x"));
//! assert_eq!(normalize("   # just a comment"), None);
//! assert_eq!(normalize("\t\r\n"), None);
//! ```
//!
//! Comment stripping is purely textual. A `#` inside what looks like a string
//! constant still starts a comment, because classification only ever sees
//! the already truncated line.

use std::io::{self, BufRead};

/// The comment marker. Not configurable.
pub const COMMENT_MARKER: char = '#';

/// Whether `c` separates words. ASCII whitespace only: space, `\t`, `\n`, `\x0B`, `\x0C`, `\r`.
///
/// Other Unicode spaces (no-break space, ideographic space, ...) are ordinary characters and
/// can appear inside string constants.
pub fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// A raw line after normalization, together with where it came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceLine<'input> {
    /// 1-based position of the line in the input.
    pub number: usize,
    /// The normalized text, or `None` for blank and comment-only lines.
    pub content: Option<&'input str>,
    /// Whether the raw line carried a comment marker.
    pub comment: bool,
}

impl<'input> SourceLine<'input> {
    pub fn new(number: usize, raw: &'input str) -> Self {
        Self {
            number,
            content: normalize(raw),
            comment: has_comment(raw),
        }
    }
}

/// Strip the line ending, trailing comment and surrounding whitespace from `raw`.
///
/// Returns `None` when nothing but whitespace remains. That is a signal to skip the line, not an error.
pub fn normalize(raw: &str) -> Option<&str> {
    let line = strip_line_ending(raw);
    let line = match line.find(COMMENT_MARKER) {
        Some(marker) => &line[..marker],
        None => line,
    };
    let line = line.trim_matches(is_separator);

    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}

/// Whether `raw` contains a comment marker anywhere.
pub fn has_comment(raw: &str) -> bool {
    raw.contains(COMMENT_MARKER)
}

/// Read every line of `reader`.
///
/// Input that isn't valid UTF-8 fails with [`io::ErrorKind::InvalidData`].
pub fn read_lines<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    reader.lines().collect()
}

fn strip_line_ending(raw: &str) -> &str {
    let raw = raw.strip_suffix('\n').unwrap_or(raw);
    raw.strip_suffix('\r').unwrap_or(raw)
}
