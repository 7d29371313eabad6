//! Primitive matchers over the input text.

use super::{END_OF_INPUT, Expected, Parser, Success};
use crate::error::GrammarError;
use compact_str::{CompactString, format_compact};

/// Match the exact string `s`.
#[must_use]
pub fn literal(s: impl Into<String>) -> Parser<String> {
    let s: String = s.into();
    let description = describe_literal(&s);
    let expected = description.clone();
    Parser::new(move |ctx, pos| {
        if ctx.rest(pos).starts_with(s.as_str()) {
            Ok(Success::new(s.clone(), pos + s.len()))
        } else {
            Err(ctx.fail(pos, Expected::one(expected.clone())))
        }
    })
    .described(description)
}

/// Match the single character `c`.
#[must_use]
pub fn char(c: char) -> Parser<char> {
    let description = format_compact!("'{}'", c.escape_debug());
    satisfy(description, move |next| next == c)
}

/// Match one character in the inclusive range `from..=to`.
#[must_use]
pub fn char_range(from: char, to: char) -> Parser<char> {
    let description = format_compact!("'{}'..'{}'", from.escape_debug(), to.escape_debug());
    satisfy(description, move |next| (from..=to).contains(&next))
}

/// Match any single character; fails only at end of input.
#[must_use]
pub fn any_char() -> Parser<char> {
    satisfy("any character", |_| true)
}

/// Match one character accepted by `predicate`, described as `description`.
#[must_use]
pub fn satisfy<F>(description: impl Into<CompactString>, predicate: F) -> Parser<char>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    let description = description.into();
    let expected = description.clone();
    Parser::new(move |ctx, pos| match ctx.rest(pos).chars().next() {
        Some(next) if predicate(next) => Ok(Success::new(next, pos + next.len_utf8())),
        _ => Err(ctx.fail(pos, Expected::one(expected.clone()))),
    })
    .described(description)
}

/// Match the regular expression `pattern` anchored at the current offset.
///
/// The pattern is only ever tried at the offset the parser is invoked at;
/// it never scans forward for a later match.
///
/// # Errors
///
/// Returns [`GrammarError::InvalidRegex`] if `pattern` does not compile.
///
/// # Example
///
/// ```rust
/// use pegloom::parser::regex;
///
/// let ident = regex("[a-z]+").unwrap();
/// assert_eq!(ident.parse("abc1", 0).unwrap().value, "abc");
/// assert!(ident.parse("1abc", 0).is_err());
/// ```
pub fn regex(pattern: &str) -> Result<Parser<String>, GrammarError> {
    let anchored =
        regex::Regex::new(&format!("^(?:{pattern})")).map_err(|e| GrammarError::InvalidRegex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
    let description = format_compact!("/{pattern}/");
    let expected = description.clone();

    Ok(Parser::new(move |ctx, pos| {
        match anchored.find(ctx.rest(pos)) {
            Some(m) => Ok(Success::new(m.as_str().to_string(), pos + m.end())),
            None => Err(ctx.fail(pos, Expected::one(expected.clone()))),
        }
    })
    .described(description))
}

/// Succeed with zero width only at end of input.
#[must_use]
pub fn eof() -> Parser<()> {
    Parser::new(|ctx, pos| {
        if pos >= ctx.input().len() {
            Ok(Success::new((), pos))
        } else {
            Err(ctx.fail(pos, Expected::one(END_OF_INPUT)))
        }
    })
    .described(END_OF_INPUT)
}

/// Quote a literal the way failure messages show it
pub(crate) fn describe_literal(s: &str) -> CompactString {
    format_compact!("'{}'", s.escape_debug())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_matches_prefix() {
        let success = literal("let").parse("let x", 0).unwrap();
        assert_eq!(success.value, "let");
        assert_eq!(success.pos, 3);
    }

    #[test]
    fn test_literal_failure_stays_at_start() {
        let failure = literal("let").parse("lex", 0).unwrap_err();
        assert_eq!(failure.pos, 0);
        assert_eq!(failure.expected.to_string(), "'let'");
    }

    #[test]
    fn test_literal_at_offset() {
        assert_eq!(literal("b").parse("ab", 1).unwrap().pos, 2);
        assert!(literal("b").parse("ab", 2).is_err());
    }

    #[test]
    fn test_char_and_range() {
        assert_eq!(char('x').parse("xy", 0).unwrap().value, 'x');
        assert!(char('x').parse("yx", 0).is_err());

        let digit = char_range('0', '9');
        assert_eq!(digit.parse("7", 0).unwrap().value, '7');
        assert_eq!(digit.parse("a", 0).unwrap_err().expected.to_string(), "'0'..'9'");
    }

    #[test]
    fn test_any_char_multibyte() {
        let success = any_char().parse("éa", 0).unwrap();
        assert_eq!(success.value, 'é');
        assert_eq!(success.pos, 2);
        assert!(any_char().parse("", 0).is_err());
    }

    #[test]
    fn test_regex_is_anchored() {
        let number = regex("[0-9]+").unwrap();
        assert!(number.parse("ab12", 0).is_err());
        let success = number.parse("ab12", 2).unwrap();
        assert_eq!(success.value, "12");
        assert_eq!(success.pos, 4);
    }

    #[test]
    fn test_regex_alternation_is_grouped() {
        let keyword = regex("if|else").unwrap();
        assert!(keyword.parse("xelse", 0).is_err());
        assert_eq!(keyword.parse("else", 0).unwrap().pos, 4);
    }

    #[test]
    fn test_invalid_regex() {
        let error = regex("(").unwrap_err();
        assert!(matches!(error, GrammarError::InvalidRegex { .. }));
    }

    #[test]
    fn test_eof() {
        assert_eq!(eof().parse("ab", 2).unwrap().pos, 2);
        assert!(eof().parse("ab", 1).is_err());
    }
}
