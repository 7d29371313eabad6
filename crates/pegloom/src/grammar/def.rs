//! Parser for the textual grammar dialect
//!
//! The dialect is parsed with the crate's own combinators:
//!
//! ```text
//! rule = expr          // definition; the first rule is the start rule
//! a b c                sequence
//! a | b                ordered alternation
//! a*  a+  a?           repetition
//! "lit" | 'lit'        string literal
//! 'a'..'z'             inclusive character range
//! .                    any character
//! !a b                 negative lookahead, then b
//! (group)              grouping
//! name                 reference to another rule
//! ```
//!
//! Rules have no terminator. A rule body runs until the next `name =`
//! definition or the end of the text, so bodies may span several lines;
//! `\n` and `\r\n` are plain whitespace. Groups nest at most
//! [`MAX_GROUP_NESTING`] deep.

use crate::error::GrammarError;
use crate::grammar::{GrammarRule, RuleMap};
use crate::parser::{
    Expected, Failure, ParseConfig, ParseContext, Parser, Success, alt, any_char, between, char,
    choice, lazy, literal, many, many1, map, not, optional, preceded, recognize, satisfy, seq,
    seq3,
};
use log::{debug, trace};
use std::sync::LazyLock;

static SYNTAX: LazyLock<DefSyntax> = LazyLock::new(DefSyntax::new);

/// Deepest `( )` grouping accepted in one rule body.
///
/// Each level costs a long chain of combinator frames, so this is far
/// below the [`ParseConfig`] default.
pub const MAX_GROUP_NESTING: usize = 64;

/// Parse a grammar definition into its rules, in definition order.
///
/// # Errors
///
/// Returns [`GrammarError::Syntax`] (with offset, line, column and an excerpt
/// of the offending text) for a missing rule name, a missing `=`, or a
/// malformed expression; [`GrammarError::DuplicateRule`] when a name is
/// defined twice; and [`GrammarError::Empty`] when no rule is defined.
///
/// # Example
///
/// ```rust
/// use pegloom::{GrammarRule, parse_grammar_def};
///
/// let rules = parse_grammar_def("greeting = 'hello' ' '+ name\nname = 'a'..'z'+").unwrap();
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules["name"], GrammarRule::plus(GrammarRule::char_range('a', 'z')));
/// ```
pub fn parse_grammar_def(source: &str) -> Result<RuleMap, GrammarError> {
    let syntax = &*SYNTAX;
    let mut rules = RuleMap::default();

    let mut pos = syntax.skip_from(source, 0);
    while pos < source.len() {
        let name = syntax
            .identifier
            .parse(source, pos)
            .map_err(|_| GrammarError::syntax(source, pos, "missing rule name"))?;

        pos = syntax.skip_from(source, name.pos);
        if !source[pos..].starts_with('=') {
            return Err(GrammarError::syntax(
                source,
                pos,
                format!("missing `=` after rule name `{}`", name.value),
            ));
        }

        pos = syntax.skip_from(source, pos + 1);
        if pos >= source.len() || syntax.rule_start.parse(source, pos).is_ok() {
            return Err(GrammarError::syntax(
                source,
                pos,
                format!("missing expression for rule `{}`", name.value),
            ));
        }

        let body = syntax.rule_body(source, pos, &name.value)?;
        if rules.contains_key(name.value.as_str()) {
            return Err(GrammarError::DuplicateRule {
                name: name.value.into(),
            });
        }
        trace!("parsed rule `{}` = {}", name.value, body.value);
        rules.insert(name.value.into(), body.value);
        pos = syntax.skip_from(source, body.pos);
    }

    if rules.is_empty() {
        return Err(GrammarError::Empty);
    }
    debug!("parsed grammar definition with {} rules", rules.len());
    Ok(rules)
}

/// A sequence element before `!x y` pairs are folded
enum Element {
    Plain(GrammarRule),
    Not(GrammarRule),
}

struct DefSyntax {
    /// Whitespace and `//` comments
    skip: Parser<()>,
    identifier: Parser<String>,
    /// `name =`, the start of the next definition
    rule_start: Parser<()>,
    alternation: Parser<GrammarRule>,
}

impl DefSyntax {
    fn new() -> Self {
        let comment = map(
            seq(literal("//"), many(preceded(not(char('\n')), any_char()))),
            |_| (),
        );
        let space = map(satisfy("whitespace", |c| c.is_whitespace()), |_| ());
        let skip = quiet(map(many(alt(space, comment)), |_| ()));

        let identifier = recognize(seq(
            satisfy("identifier", |c| c.is_ascii_alphabetic() || c == '_'),
            many(satisfy("identifier", |c| c.is_ascii_alphanumeric() || c == '_')),
        ))
        .label("identifier");

        let rule_start = map(seq3(identifier.clone(), skip.clone(), char('=')), |_| ());

        let group = map(
            between(
                seq(char('('), skip.clone()),
                optional(lazy(|| SYNTAX.alternation.clone())),
                seq(skip.clone(), char(')')),
            ),
            |body| body.unwrap_or_else(GrammarRule::empty),
        );
        let primary = choice(vec![
            literal_or_range(),
            map(char('.'), |_| GrammarRule::Any),
            group,
            map(identifier.clone(), GrammarRule::reference),
        ]);

        let suffixed = map(
            seq(primary, many(choice(vec![char('*'), char('+'), char('?')]))),
            |(rule, suffixes)| {
                suffixes.into_iter().fold(rule, |rule, suffix| match suffix {
                    '*' => GrammarRule::star(rule),
                    '+' => GrammarRule::plus(rule),
                    _ => GrammarRule::opt(rule),
                })
            },
        );
        let prefixed = alt(
            map(preceded(seq(char('!'), skip.clone()), suffixed.clone()), Element::Not),
            map(suffixed, Element::Plain),
        )
        .label("expression");

        let element = preceded(seq(skip.clone(), quiet(not(rule_start.clone()))), prefixed);
        let sequence = map(many1(element), fold_elements);

        let alternation = map(
            seq(
                sequence.clone(),
                many(preceded(seq(skip.clone(), char('|')), sequence)),
            ),
            |(first, rest)| GrammarRule::choice(std::iter::once(first).chain(rest)),
        );

        Self {
            skip,
            identifier,
            rule_start,
            alternation,
        }
    }

    fn skip_from(&self, source: &str, pos: usize) -> usize {
        self.skip.parse(source, pos).map_or(pos, |skipped| skipped.pos)
    }

    /// Parse one rule body, which must be followed by another definition or
    /// the end of the text
    fn rule_body(
        &self,
        source: &str,
        pos: usize,
        name: &str,
    ) -> Result<Success<GrammarRule>, GrammarError> {
        let config = ParseConfig::default().with_max_depth(MAX_GROUP_NESTING);
        let mut ctx = ParseContext::with_config(source, config);
        let outcome = self.alternation.run(&mut ctx, pos);
        if let Some(at) = ctx.limit_exceeded_at() {
            debug!("rule `{name}` nests groups deeper than {MAX_GROUP_NESTING}");
            return Err(GrammarError::syntax(
                source,
                at,
                format!("grammar nesting too deep in rule `{name}` (limit {MAX_GROUP_NESTING})"),
            ));
        }
        if let Ok(body) = outcome {
            let end = self.skip_from(source, body.pos);
            if end >= source.len() || self.rule_start.parse(source, end).is_ok() {
                return Ok(body);
            }
        }

        // Rerun with tracking to point at the furthest offset any branch reached
        let mut ctx = ParseContext::with_config(source, config).tracking();
        let outcome = self.alternation.run(&mut ctx, pos);
        let failure = match (outcome.err(), ctx.take_furthest()) {
            (Some(failure), Some(furthest)) => furthest.merge(failure),
            (Some(failure), None) | (None, Some(failure)) => failure,
            (None, None) => Failure::new(pos, Expected::one("end of rule")),
        };

        Err(GrammarError::syntax(
            source,
            failure.pos,
            format!(
                "malformed expression in rule `{name}`: expected {}",
                failure.expected
            ),
        ))
    }
}

/// A quoted literal, or a character range when a one-character literal is
/// immediately followed by `..` and another one-character literal
fn literal_or_range() -> Parser<GrammarRule> {
    let quoted = alt(quoted('\''), quoted('"'));
    let range_end = quiet(preceded(literal(".."), quoted.clone()));

    Parser::new(move |ctx, pos| {
        let start = quoted.run(ctx, pos)?;
        if let Some(from) = single_char(&start.value)
            && let Ok(end) = range_end.run(ctx, start.pos)
            && let Some(to) = single_char(&end.value)
        {
            return Ok(Success::new(GrammarRule::char_range(from, to), end.pos));
        }
        Ok(Success::new(GrammarRule::literal(start.value), start.pos))
    })
}

fn quoted(quote: char) -> Parser<String> {
    let escape = preceded(
        char('\\'),
        choice(vec![
            map(char('n'), |_| '\n'),
            map(char('r'), |_| '\r'),
            map(char('t'), |_| '\t'),
            char('\\'),
            char('\''),
            char('"'),
        ]),
    );
    let plain = satisfy("literal character", move |c| {
        c != quote && c != '\\' && c != '\n'
    });
    let body = map(many(alt(plain, escape)), |chars| chars.into_iter().collect());
    between(char(quote), body, char(quote))
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Run `parser` without recording its failures
fn quiet<T: 'static>(parser: Parser<T>) -> Parser<T> {
    Parser::new(move |ctx, pos| ctx.untracked(|ctx| parser.run(ctx, pos)))
}

/// Fold `!x` markers into negations of the element that follows them
fn fold_elements(elements: Vec<Element>) -> GrammarRule {
    let mut elements = elements.into_iter();
    let mut rules = Vec::new();
    while let Some(element) = elements.next() {
        rules.push(fold_element(element, &mut elements));
    }
    GrammarRule::seq(rules)
}

fn fold_element(element: Element, rest: &mut impl Iterator<Item = Element>) -> GrammarRule {
    match element {
        Element::Plain(rule) => rule,
        Element::Not(rule) => {
            let then = match rest.next() {
                Some(next) => fold_element(next, rest),
                None => GrammarRule::empty(),
            };
            GrammarRule::not_followed_by(rule, then)
        }
    }
}
