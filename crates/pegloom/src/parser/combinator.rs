//! Combinators building larger parsers out of smaller ones.

use super::{Expected, Failure, Parser, Success};
use compact_str::{CompactString, format_compact};
use std::sync::OnceLock;

/// Run `first` then `second`, producing both values.
///
/// Fails with the first failing member's failure.
#[must_use]
pub fn seq<A, B>(first: Parser<A>, second: Parser<B>) -> Parser<(A, B)>
where
    A: 'static,
    B: 'static,
{
    Parser::new(move |ctx, pos| {
        let a = first.run(ctx, pos)?;
        let b = second.run(ctx, a.pos)?;
        Ok(Success::new((a.value, b.value), b.pos))
    })
}

/// Run three parsers in order, producing all three values.
#[must_use]
pub fn seq3<A, B, C>(first: Parser<A>, second: Parser<B>, third: Parser<C>) -> Parser<(A, B, C)>
where
    A: 'static,
    B: 'static,
    C: 'static,
{
    Parser::new(move |ctx, pos| {
        let a = first.run(ctx, pos)?;
        let b = second.run(ctx, a.pos)?;
        let c = third.run(ctx, b.pos)?;
        Ok(Success::new((a.value, b.value, c.value), c.pos))
    })
}

/// Ordered choice: try `first`, and only if it fails try `second` from the
/// same offset.
///
/// A success of `first` is returned without ever running `second`. When both
/// fail, the failure that reached further is reported; on a tie the two
/// expectations are combined.
#[must_use]
pub fn alt<T: 'static>(first: Parser<T>, second: Parser<T>) -> Parser<T> {
    let description = match (first.description(), second.description()) {
        (Some(a), Some(b)) => Some(format_compact!("{a} or {b}")),
        _ => None,
    };

    let parser = Parser::new(move |ctx, pos| match first.run(ctx, pos) {
        Ok(success) => Ok(success),
        Err(first_failure) => second
            .run(ctx, pos)
            .map_err(|second_failure| first_failure.merge(second_failure)),
    });

    match description {
        Some(description) => parser.described(description),
        None => parser,
    }
}

/// Ordered choice over any number of alternatives.
///
/// An empty list never matches.
#[must_use]
pub fn choice<T: 'static>(alternatives: Vec<Parser<T>>) -> Parser<T> {
    Parser::new(move |ctx, pos| {
        let mut failure: Option<Failure> = None;
        for alternative in &alternatives {
            match alternative.run(ctx, pos) {
                Ok(success) => return Ok(success),
                Err(f) => {
                    failure = Some(match failure {
                        Some(previous) => previous.merge(f),
                        None => f,
                    });
                }
            }
        }
        Err(failure.unwrap_or_else(|| ctx.fail(pos, Expected::default())))
    })
}

/// Match `parser` between `min` and `max` times (`None` for unbounded).
///
/// A zero-width match ends the loop: repeating it could never make
/// progress. It counts towards `min` (so `repeat(optional(x), 1, None)`
/// succeeds on any input) but is otherwise not included in the output.
#[must_use]
pub fn repeat<T: 'static>(parser: Parser<T>, min: usize, max: Option<usize>) -> Parser<Vec<T>> {
    let max = max.map(|max| max.max(min));
    Parser::new(move |ctx, pos| {
        let mut values = Vec::new();
        let mut cur = pos;
        let mut satisfied = false;
        let mut last_failure = None;

        while max.is_none_or(|max| values.len() < max) {
            match parser.run(ctx, cur) {
                Ok(success) if success.pos == cur => {
                    if values.len() < min {
                        values.push(success.value);
                    }
                    satisfied = true;
                    break;
                }
                Ok(success) => {
                    values.push(success.value);
                    cur = success.pos;
                }
                Err(failure) => {
                    last_failure = Some(failure);
                    break;
                }
            }
        }

        if values.len() < min && !satisfied {
            return Err(last_failure.unwrap_or_else(|| ctx.fail(cur, Expected::default())));
        }
        Ok(Success::new(values, cur))
    })
}

/// Zero or more matches. Always succeeds.
#[must_use]
pub fn many<T: 'static>(parser: Parser<T>) -> Parser<Vec<T>> {
    repeat(parser, 0, None)
}

/// One or more matches; fails with the first sub-failure if none are found.
#[must_use]
pub fn many1<T: 'static>(parser: Parser<T>) -> Parser<Vec<T>> {
    repeat(parser, 1, None)
}

/// Match `parser` or succeed with `None` without consuming input.
#[must_use]
pub fn optional<T: 'static>(parser: Parser<T>) -> Parser<Option<T>> {
    Parser::new(move |ctx, pos| match parser.run(ctx, pos) {
        Ok(success) => Ok(success.map(Some)),
        Err(_) => Ok(Success::new(None, pos)),
    })
}

/// Negative lookahead: succeed with zero width iff `parser` fails here.
///
/// Failures inside the lookahead are not recorded for furthest-failure
/// reporting, since they are what makes `not` succeed.
#[must_use]
pub fn not<T: 'static>(parser: Parser<T>) -> Parser<()> {
    let expected: CompactString = match parser.description() {
        Some(description) => format_compact!("not {description}"),
        None => CompactString::const_new("something else"),
    };
    Parser::new(move |ctx, pos| {
        let outcome = ctx.untracked(|ctx| parser.run(ctx, pos));
        match outcome {
            Ok(_) => Err(ctx.fail(pos, Expected::one(expected.clone()))),
            Err(_) => Ok(Success::new((), pos)),
        }
    })
}

/// Transform the produced value. Failures pass through unchanged.
#[must_use]
pub fn map<T, U, F>(parser: Parser<T>, f: F) -> Parser<U>
where
    T: 'static,
    U: 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    let description = parser.description.clone();
    let mapped = Parser::new(move |ctx, pos| parser.run(ctx, pos).map(|success| success.map(&f)));
    match description {
        Some(description) => mapped.described(description),
        None => mapped,
    }
}

/// Zero or more `item`s separated by `separator`.
///
/// Succeeds with an empty list when the first item does not match.
#[must_use]
pub fn sep_by<T, S>(item: Parser<T>, separator: Parser<S>) -> Parser<Vec<T>>
where
    T: 'static,
    S: 'static,
{
    let items = sep_by1(item, separator);
    Parser::new(move |ctx, pos| match items.run(ctx, pos) {
        Ok(success) => Ok(success),
        Err(_) => Ok(Success::new(Vec::new(), pos)),
    })
}

/// One or more `item`s separated by `separator`.
///
/// A trailing separator is not consumed.
#[must_use]
pub fn sep_by1<T, S>(item: Parser<T>, separator: Parser<S>) -> Parser<Vec<T>>
where
    T: 'static,
    S: 'static,
{
    Parser::new(move |ctx, pos| {
        let first = item.run(ctx, pos)?;
        let mut values = vec![first.value];
        let mut cur = first.pos;

        loop {
            let Ok(sep) = separator.run(ctx, cur) else {
                break;
            };
            let Ok(next) = item.run(ctx, sep.pos) else {
                break;
            };
            if next.pos == cur {
                break;
            }
            values.push(next.value);
            cur = next.pos;
        }

        Ok(Success::new(values, cur))
    })
}

/// Match `open`, `parser`, `close` in order and keep only the middle value.
#[must_use]
pub fn between<O, T, C>(open: Parser<O>, parser: Parser<T>, close: Parser<C>) -> Parser<T>
where
    O: 'static,
    T: 'static,
    C: 'static,
{
    map(seq3(open, parser, close), |(_, value, _)| value)
}

/// Match `prefix` then `parser`, keeping the value of `parser`.
#[must_use]
pub fn preceded<P, T>(prefix: Parser<P>, parser: Parser<T>) -> Parser<T>
where
    P: 'static,
    T: 'static,
{
    map(seq(prefix, parser), |(_, value)| value)
}

/// Match `parser` then `suffix`, keeping the value of `parser`.
#[must_use]
pub fn terminated<T, S>(parser: Parser<T>, suffix: Parser<S>) -> Parser<T>
where
    T: 'static,
    S: 'static,
{
    map(seq(parser, suffix), |(value, _)| value)
}

/// Produce the text consumed by `parser` instead of its value.
#[must_use]
pub fn recognize<T: 'static>(parser: Parser<T>) -> Parser<String> {
    Parser::new(move |ctx, pos| {
        let end = parser.run(ctx, pos)?.pos;
        let text = ctx.input().get(pos..end).unwrap_or_default();
        Ok(Success::new(text.to_string(), end))
    })
}

/// Report any failure that did not get past the starting offset as `name`.
///
/// Failures deeper inside `parser` keep their own, more precise description.
/// With tracking on, expectations recorded at the starting offset by the
/// inner parser are replaced by `name` as well.
#[must_use]
pub fn label<T: 'static>(parser: Parser<T>, name: impl Into<CompactString>) -> Parser<T> {
    let name = name.into();
    let expected = name.clone();
    Parser::new(move |ctx, pos| {
        let outer = ctx.take_furthest();
        let outcome = parser.run(ctx, pos);
        let inner = ctx.take_furthest();

        if let Some(outer) = outer {
            ctx.record(&outer);
        }
        match inner {
            Some(inner) if inner.pos > pos => ctx.record(&inner),
            Some(_) => ctx.record(&Failure::new(pos, Expected::one(expected.clone()))),
            None => {}
        }

        match outcome {
            Err(failure) if failure.pos == pos => {
                Err(ctx.fail(pos, Expected::one(expected.clone())))
            }
            other => other,
        }
    })
    .described(name)
}

/// Defer building a parser until it is first used.
///
/// The built parser is memoized, so `f` runs at most once. This is what lets
/// parsers refer to each other before either is fully defined:
///
/// ```rust
/// use pegloom::parser::{alt, between, char, lazy, map, Parser};
///
/// // nested = '(' nested ')' | 'x'
/// fn nested() -> Parser<usize> {
///     alt(
///         map(between(char('('), lazy(nested), char(')')), |depth| depth + 1),
///         map(char('x'), |_| 0),
///     )
/// }
///
/// assert_eq!(nested().parse_all("((x))").unwrap(), 2);
/// ```
///
/// Each invocation counts against [`ParseConfig::max_depth`](super::ParseConfig).
#[must_use]
pub fn lazy<T, F>(f: F) -> Parser<T>
where
    T: 'static,
    F: Fn() -> Parser<T> + Send + Sync + 'static,
{
    let cell: OnceLock<Parser<T>> = OnceLock::new();
    Parser::new(move |ctx, pos| {
        let parser = cell.get_or_init(&f);
        ctx.nested(pos, |ctx| parser.run(ctx, pos))
    })
}
