//! # Parser Core
//!
//! The [`Parser`] abstraction, its result types, and the call-scoped
//! [`ParseContext`] every parser runs against.
//!
//! ## Overview
//!
//! A `Parser<T>` is an immutable function object from `(input, offset)` to a
//! [`ParseResult<T>`]. Parsers are cheap to clone (they share their
//! implementation through an `Arc`) and are `Send + Sync`, so a parser built
//! once can be reused from any number of threads.
//!
//! Local failures are values, not errors: a [`Failure`] records the offset
//! reached and an [`Expected`] description of what would have matched there.
//! Ordered choice keeps whichever failure got further, so deeply alternated
//! parsers still report a useful location.
//!
//! ## Usage
//!
//! ```rust
//! use pegloom::parser::{alt, char, many1, map, digit};
//!
//! let number = map(many1(digit()), |digits| digits.into_iter().collect::<String>());
//! let signed = alt(map(char('-'), |_| String::from("-")), number.clone());
//!
//! assert_eq!(number.parse_all("123").unwrap(), "123");
//! assert!(signed.parse("x", 0).is_err());
//! ```

mod combinator;
mod context;
mod primitive;
mod text;

pub use combinator::*;
pub use context::{ParseConfig, ParseContext};
pub use primitive::*;
pub use text::*;

use crate::error::ParseError;
use compact_str::CompactString;
use smallvec::SmallVec;
use std::sync::Arc;

/// Result of running a parser at one offset.
pub type ParseResult<T> = Result<Success<T>, Failure>;

/// A successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Success<T> {
    /// The produced value
    pub value: T,
    /// Offset immediately after the consumed span
    pub pos: usize,
}

impl<T> Success<T> {
    #[must_use]
    pub const fn new(value: T, pos: usize) -> Self {
        Self { value, pos }
    }

    /// Transform the value, keeping the end offset
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Success<U> {
        Success {
            value: f(self.value),
            pos: self.pos,
        }
    }
}

/// A local parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Furthest offset reached before failing
    pub pos: usize,
    /// What would have matched at `pos`
    pub expected: Expected,
}

impl Failure {
    #[must_use]
    pub const fn new(pos: usize, expected: Expected) -> Self {
        Self { pos, expected }
    }

    /// Combine two failures of alternatives tried from the same offset.
    ///
    /// The failure that got further wins; on a tie both expectations are kept.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match self.pos.cmp(&other.pos) {
            std::cmp::Ordering::Greater => self,
            std::cmp::Ordering::Less => other,
            std::cmp::Ordering::Equal => Self {
                pos: self.pos,
                expected: self.expected.union(other.expected),
            },
        }
    }
}

/// Human-readable description of what a parser would have accepted.
///
/// Holds one entry per distinct alternative, rendered as `a`, `a or b`, or
/// `a, b, or c`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Expected(SmallVec<[CompactString; 2]>);

impl Expected {
    /// A single expectation
    #[must_use]
    pub fn one(description: impl Into<CompactString>) -> Self {
        let mut items = SmallVec::new();
        items.push(description.into());
        Self(items)
    }

    /// Add a description unless it is already present
    pub fn push(&mut self, description: impl Into<CompactString>) {
        let description = description.into();
        if !self.0.contains(&description) {
            self.0.push(description);
        }
    }

    /// Union of two expectation sets, preserving first-seen order
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        for item in other.0 {
            self.push(item);
        }
        self
    }

    /// Whether `description` is one of the expected items
    #[must_use]
    pub fn contains(&self, description: &str) -> bool {
        self.0.iter().any(|item| item == description)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(CompactString::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.as_slice() {
            [] => f.write_str("nothing"),
            [only] => f.write_str(only),
            [first, second] => write!(f, "{first} or {second}"),
            [init @ .., last] => {
                for item in init {
                    write!(f, "{item}, ")?;
                }
                write!(f, "or {last}")
            }
        }
    }
}

type ParseFn<T> = dyn Fn(&mut ParseContext<'_>, usize) -> ParseResult<T> + Send + Sync;

/// A composable, immutable parser producing values of type `T`.
///
/// See the [module documentation](self) for an overview.
pub struct Parser<T> {
    run: Arc<ParseFn<T>>,
    description: Option<CompactString>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
            description: self.description.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Parser<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Parser<T> {
    /// Wrap a parsing function.
    ///
    /// The function must never return a success whose `pos` is before the
    /// offset it was given, and should build failures with
    /// [`ParseContext::fail`] so they take part in furthest-failure tracking.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn(&mut ParseContext<'_>, usize) -> ParseResult<T> + Send + Sync + 'static,
    {
        Self {
            run: Arc::new(run),
            description: None,
        }
    }

    /// Attach a description used by `not` and by [`label`] errors
    #[must_use]
    pub fn described(mut self, description: impl Into<CompactString>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Short description of what this parser matches, if it has one
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Run the parser inside an existing context.
    ///
    /// This is how combinators invoke their children; it shares the caller's
    /// failure tracking and depth accounting.
    #[inline]
    pub fn run(&self, ctx: &mut ParseContext<'_>, pos: usize) -> ParseResult<T> {
        (self.run)(ctx, pos)
    }

    /// Run the parser at `pos` without requiring the whole input to match.
    ///
    /// # Errors
    ///
    /// Returns the local [`Failure`] if the parser does not match at `pos`.
    pub fn parse(&self, input: &str, pos: usize) -> ParseResult<T> {
        let mut ctx = ParseContext::new(input);
        self.run(&mut ctx, pos)
    }

    /// Run the parser from offset 0 and require it to consume all input.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the parser fails, or if it succeeds but
    /// stops before the end of input (reported as "expected end of input").
    pub fn parse_all(&self, input: &str) -> Result<T, ParseError> {
        self.parse_all_with(ParseContext::new(input))
    }

    /// Like [`parse_all`](Self::parse_all), but reports the furthest failure
    /// seen anywhere during the attempt instead of the last one.
    ///
    /// # Errors
    ///
    /// See [`parse_all`](Self::parse_all).
    pub fn parse_all_tracked(&self, input: &str) -> Result<T, ParseError> {
        self.parse_all_with(ParseContext::new(input).tracking())
    }

    /// Total parse in a caller-configured context.
    ///
    /// A branch cut off by the depth limit does not fail the parse on its own:
    /// if another alternative consumes the whole input, that value is
    /// returned, as [`parse`](Self::parse) would. Only when the total parse
    /// fails is the limit reported, as [`ParseError::RecursionLimit`].
    ///
    /// # Errors
    ///
    /// See [`parse_all`](Self::parse_all).
    pub fn parse_all_with(&self, mut ctx: ParseContext<'_>) -> Result<T, ParseError> {
        let input = ctx.input();
        let outcome = match self.run(&mut ctx, 0) {
            Ok(success) if success.pos == input.len() => return Ok(success.value),
            outcome => outcome,
        };

        if let Some(pos) = ctx.limit_exceeded_at() {
            return Err(ParseError::recursion_limit(input, pos, ctx.config().max_depth));
        }

        let failure = match outcome {
            Ok(success) => ctx.fail(success.pos, Expected::one(END_OF_INPUT)),
            Err(failure) => failure,
        };

        let failure = match ctx.take_furthest() {
            Some(furthest) => furthest.merge(failure),
            None => failure,
        };
        Err(ParseError::unexpected(input, failure.pos, failure.expected))
    }

    /// Transform the produced value. Failures pass through unchanged.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Parser<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        map(self, f)
    }

    /// Ordered choice with `other`
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        alt(self, other)
    }

    /// Sequence with `other`, producing both values
    #[must_use]
    pub fn then<U: 'static>(self, other: Parser<U>) -> Parser<(T, U)> {
        seq(self, other)
    }

    /// Report failures at the starting offset as `name`
    #[must_use]
    pub fn label(self, name: impl Into<CompactString>) -> Self {
        label(self, name)
    }
}

/// Description used for leftover input in total parses
pub const END_OF_INPUT: &str = "end of input";
