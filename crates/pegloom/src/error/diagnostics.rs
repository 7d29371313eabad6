//! # Diagnostic Utilities
//!
//! Helpers for rendering errors together with the source text they point at.

use crate::error::ParseError;
use crate::line_col::LineIndex;
use std::fmt::Write;

/// Number of characters shown in grammar syntax error excerpts
pub const EXCERPT_CHARS: usize = 20;

/// Extract up to `max_chars` characters of `source` starting at `offset`,
/// stopping at the end of the line.
#[must_use]
pub fn excerpt(source: &str, offset: usize, max_chars: usize) -> String {
    let mut start = offset.min(source.len());
    while !source.is_char_boundary(start) {
        start -= 1;
    }

    source[start..]
        .chars()
        .take_while(|&c| c != '\n' && c != '\r')
        .take(max_chars)
        .collect()
}

/// Format an error followed by the source line it points at and a caret
/// under the failing column.
///
/// # Example
///
/// ```rust
/// use pegloom::{Expected, ParseError};
/// use pegloom::error::diagnostics::format_error_with_context;
///
/// let source = "let x = ;";
/// let error = ParseError::unexpected(source, 8, Expected::one("expression"));
/// let rendered = format_error_with_context(&error, source);
/// assert!(rendered.ends_with("        ^"));
/// ```
#[must_use]
pub fn format_error_with_context(error: &ParseError, source: &str) -> String {
    let mut result = String::new();
    let _ = write!(result, "{error}");

    let index = LineIndex::new(source);
    let position = error.line_col();
    if let Some(range) = index.line_range(position.line) {
        let line_text = source[range].trim_end_matches('\r');
        let gutter = position.line.to_string();
        let _ = write!(result, "\n{gutter} | {line_text}");
        let _ = write!(
            result,
            "\n{} | {}^",
            " ".repeat(gutter.len()),
            " ".repeat(position.column.saturating_sub(1))
        );
    }

    result
}
