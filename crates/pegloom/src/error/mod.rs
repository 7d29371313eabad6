//! # Error Types
//!
//! Error types for running parsers and for compiling grammars.
//!
//! ## Overview
//!
//! Local parse failures are plain data ([`Failure`](crate::Failure)) and are
//! never raised as errors: `alt`, `optional` and `not` recover from them.
//! The types here are what callers eventually see:
//!
//! - [`ParseError`]: a total parse (`parse_all`) did not succeed, either
//!   because no alternative matched or because input was left over
//! - [`GrammarError`]: a grammar definition could not be parsed, validated,
//!   or built
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors integrate with [`miette`]
//! for rich error reporting.

pub mod diagnostics;

use crate::line_col::LineCol;
use crate::parser::Expected;
use compact_str::CompactString;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Error returned by the total-parse entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    #[error("Parse error at line {line}, col {column}: expected {expected}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parse::unexpected)))]
    Unexpected {
        #[cfg_attr(feature = "diagnostics", label("here"))]
        offset: usize,
        line: usize,
        column: usize,
        expected: Expected,
    },

    #[error("Parse error at line {line}, col {column}: recursion depth limit of {limit} exceeded")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parse::recursion_limit)))]
    RecursionLimit {
        #[cfg_attr(feature = "diagnostics", label("nesting too deep"))]
        offset: usize,
        line: usize,
        column: usize,
        limit: usize,
    },
}

impl ParseError {
    /// Create an error for a failure at `offset` in `input`
    #[must_use]
    pub fn unexpected(input: &str, offset: usize, expected: Expected) -> Self {
        let LineCol { line, column } = LineCol::of(input, offset);
        Self::Unexpected {
            offset,
            line,
            column,
            expected,
        }
    }

    /// Create an error for a parse that nested deeper than `limit`
    #[must_use]
    pub fn recursion_limit(input: &str, offset: usize, limit: usize) -> Self {
        let LineCol { line, column } = LineCol::of(input, offset);
        Self::RecursionLimit {
            offset,
            line,
            column,
            limit,
        }
    }

    /// Byte offset of the failure
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Unexpected { offset, .. } | Self::RecursionLimit { offset, .. } => *offset,
        }
    }

    /// One-based line/column of the failure
    #[must_use]
    pub const fn line_col(&self) -> LineCol {
        match self {
            Self::Unexpected { line, column, .. } | Self::RecursionLimit { line, column, .. } => {
                LineCol::new(*line, *column)
            }
        }
    }

    /// What would have matched at the failure offset, if known
    #[must_use]
    pub const fn expected(&self) -> Option<&Expected> {
        match self {
            Self::Unexpected { expected, .. } => Some(expected),
            Self::RecursionLimit { .. } => None,
        }
    }

    /// Format the error followed by the offending source line and a caret
    #[must_use]
    pub fn format_with_context(&self, source: &str) -> String {
        diagnostics::format_error_with_context(self, source)
    }
}

/// Error raised while turning a grammar definition into a [`Grammar`](crate::Grammar).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("Grammar syntax error at line {line}, col {column} (offset {offset}): {message} near `{excerpt}`")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::syntax)))]
    Syntax {
        #[cfg_attr(feature = "diagnostics", label("here"))]
        offset: usize,
        line: usize,
        column: usize,
        message: String,
        excerpt: String,
    },

    #[error("Grammar definition contains no rules")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::empty)))]
    Empty,

    #[error("Rule `{name}` is defined more than once")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::duplicate_rule)))]
    DuplicateRule { name: CompactString },

    #[error("Rule `{rule}` references undefined rule `{reference}`")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::undefined_rule)))]
    UndefinedRule {
        rule: CompactString,
        reference: CompactString,
    },

    #[error(
        "Left recursion detected: {}. Rewrite the rule in iterative form, \
         e.g. `a = b (op b)*` instead of `a = a op b`",
        format_cycle(.cycle)
    )]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(grammar::left_recursion),
            help("PEG parsers cannot expand a rule that reaches itself before consuming input")
        )
    )]
    LeftRecursion { cycle: Vec<CompactString> },

    #[error("Start rule `{name}` is not defined")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::unknown_start_rule)))]
    UnknownStartRule { name: CompactString },

    #[error("Invalid regex `{pattern}`: {message}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::invalid_regex)))]
    InvalidRegex { pattern: String, message: String },
}

impl GrammarError {
    /// Create a syntax error at `offset` in the grammar text `source`
    #[must_use]
    pub fn syntax(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let LineCol { line, column } = LineCol::of(source, offset);
        Self::Syntax {
            offset,
            line,
            column,
            message: message.into(),
            excerpt: diagnostics::excerpt(source, offset, diagnostics::EXCERPT_CHARS),
        }
    }

    /// The reference path of a left-recursion error, e.g. `["expr", "term", "expr"]`
    #[must_use]
    pub fn cycle(&self) -> Option<&[CompactString]> {
        match self {
            Self::LeftRecursion { cycle } => Some(cycle),
            _ => None,
        }
    }
}

fn format_cycle(cycle: &[CompactString]) -> String {
    cycle
        .iter()
        .map(CompactString::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_format() {
        let error = ParseError::unexpected("ab\ncd", 4, Expected::one("'x'"));
        assert_eq!(
            error.to_string(),
            "Parse error at line 2, col 2: expected 'x'"
        );
        assert_eq!(error.offset(), 4);
        assert_eq!(error.line_col(), LineCol::new(2, 2));
    }

    #[test]
    fn test_recursion_limit_message() {
        let error = ParseError::recursion_limit("((((", 3, 2);
        let message = error.to_string();
        assert!(message.contains("col 4"));
        assert!(message.contains("limit of 2"));
        assert!(error.expected().is_none());
    }

    #[test]
    fn test_left_recursion_message_contains_path() {
        let error = GrammarError::LeftRecursion {
            cycle: vec!["expr".into(), "term".into(), "expr".into()],
        };
        let message = error.to_string();
        assert!(message.contains("expr -> term -> expr"));
        assert!(message.contains("(op b)*"));
        assert_eq!(error.cycle().map(<[_]>::len), Some(3));
    }

    #[test]
    fn test_syntax_error_carries_excerpt() {
        let source = "a = 'x'\nb 'y'";
        let error = GrammarError::syntax(source, 10, "expected `=`");
        match &error {
            GrammarError::Syntax {
                line,
                column,
                excerpt,
                ..
            } => {
                assert_eq!((*line, *column), (2, 3));
                assert_eq!(excerpt, "'y'");
            }
            other => panic!("Expected Syntax, got {other:?}"),
        }
        assert!(error.to_string().contains("offset 10"));
    }
}
