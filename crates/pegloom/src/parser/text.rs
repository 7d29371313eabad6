//! Convenience parsers for common lexical pieces.

use super::{
    Expected, Parser, Success, alt, between, char, choice, many, many1, map, optional, preceded,
    recognize, satisfy, seq, seq3,
};

/// One ASCII digit
#[must_use]
pub fn digit() -> Parser<char> {
    satisfy("digit", |c| c.is_ascii_digit())
}

/// One alphabetic character
#[must_use]
pub fn letter() -> Parser<char> {
    satisfy("letter", |c| c.is_alphabetic())
}

/// Zero or more whitespace characters. Always succeeds.
#[must_use]
pub fn whitespace() -> Parser<()> {
    map(many(satisfy("whitespace", |c| c.is_whitespace())), |_| ())
}

/// `parser` with any surrounding whitespace stripped
#[must_use]
pub fn token<T: 'static>(parser: Parser<T>) -> Parser<T> {
    between(whitespace(), parser, whitespace())
}

/// Optionally signed decimal integer.
///
/// Values that do not fit in an `i64` fail at the start of the number.
#[must_use]
pub fn integer() -> Parser<i64> {
    let text = recognize(seq(optional(char('-')), many1(digit())));
    Parser::new(move |ctx, pos| {
        let success = text.run(ctx, pos)?;
        match success.value.parse::<i64>() {
            Ok(value) => Ok(Success::new(value, success.pos)),
            Err(_) => Err(ctx.fail(pos, Expected::one("integer in range"))),
        }
    })
    .described("integer")
}

/// Optionally signed decimal number with optional fraction and exponent
#[must_use]
pub fn float() -> Parser<f64> {
    let digits = || many1(digit());
    let fraction = optional(preceded(char('.'), digits()));
    let exponent = optional(seq3(
        alt(char('e'), char('E')),
        optional(alt(char('+'), char('-'))),
        digits(),
    ));
    let text = recognize(seq(
        seq(optional(char('-')), digits()),
        seq(fraction, exponent),
    ));

    Parser::new(move |ctx, pos| {
        let success = text.run(ctx, pos)?;
        match success.value.parse::<f64>() {
            Ok(value) => Ok(Success::new(value, success.pos)),
            Err(_) => Err(ctx.fail(pos, Expected::one("number"))),
        }
    })
    .described("number")
}

/// Double-quoted string, producing its unescaped contents.
///
/// Recognized escapes are `\"`, `\\`, `\n`, `\r`, `\t` and `\/`; any other
/// backslash sequence fails.
#[must_use]
pub fn quoted_string() -> Parser<String> {
    let escape = preceded(
        char('\\'),
        choice(vec![
            char('"'),
            char('\\'),
            map(char('n'), |_| '\n'),
            map(char('r'), |_| '\r'),
            map(char('t'), |_| '\t'),
            char('/'),
        ]),
    );
    let plain = satisfy("string character", |c| c != '"' && c != '\\');
    let body = map(many(alt(plain, escape)), |chars| chars.into_iter().collect());

    between(char('"'), body, char('"')).described("string")
}
