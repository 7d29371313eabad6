//! Grammar rule intermediate representation
//!
//! `GrammarRule` is the tree a textual grammar definition parses into and
//! what the builder compiles into parsers. It can also be assembled by hand
//! with the constructor methods and printed back in the textual dialect.

use compact_str::CompactString;
use indexmap::IndexMap;
use std::fmt;

/// Named rules in definition order.
///
/// The first entry is the default start rule.
pub type RuleMap = IndexMap<CompactString, GrammarRule, ahash::RandomState>;

/// One node of a grammar rule body
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum GrammarRule {
    /// Match an exact string
    Literal(CompactString),
    /// Match one character in an inclusive range
    CharRange {
        /// Lowest accepted character
        from: char,
        /// Highest accepted character
        to: char,
    },
    /// Match any single character
    Any,
    /// Match every element in order
    Sequence(Vec<GrammarRule>),
    /// Ordered choice: the first matching branch wins
    Alternation(Vec<GrammarRule>),
    /// Match a rule repeatedly
    Repetition {
        /// Repeated rule
        rule: Box<GrammarRule>,
        /// Minimum number of matches
        min: usize,
        /// Maximum number of matches (None for unlimited)
        max: Option<usize>,
    },
    /// Match a rule or nothing
    Optional(Box<GrammarRule>),
    /// Fail if `rule` matches here, otherwise match `then`
    Negation {
        /// Lookahead that must not match
        rule: Box<GrammarRule>,
        /// Continuation matched when the lookahead fails
        then: Box<GrammarRule>,
    },
    /// Invoke another named rule
    Reference(CompactString),
    /// Reserved hook for semantic actions; currently matches `rule` unchanged
    Action(Box<GrammarRule>),
}

// Builder methods
impl GrammarRule {
    #[must_use]
    pub fn literal(value: impl Into<CompactString>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub const fn char_range(from: char, to: char) -> Self {
        Self::CharRange { from, to }
    }

    #[must_use]
    pub const fn any() -> Self {
        Self::Any
    }

    /// A sequence; a single element is returned as is
    #[must_use]
    pub fn seq<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut rules: Vec<_> = rules.into_iter().collect();
        if rules.len() == 1 {
            rules.remove(0)
        } else {
            Self::Sequence(rules)
        }
    }

    /// An ordered choice; a single branch is returned as is
    #[must_use]
    pub fn choice<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut rules: Vec<_> = rules.into_iter().collect();
        if rules.len() == 1 {
            rules.remove(0)
        } else {
            Self::Alternation(rules)
        }
    }

    /// Zero or more
    #[must_use]
    pub fn star(rule: Self) -> Self {
        Self::repeat(rule, 0, None)
    }

    /// One or more
    #[must_use]
    pub fn plus(rule: Self) -> Self {
        Self::repeat(rule, 1, None)
    }

    #[must_use]
    pub fn repeat(rule: Self, min: usize, max: Option<usize>) -> Self {
        Self::Repetition {
            rule: Box::new(rule),
            min,
            max,
        }
    }

    #[must_use]
    pub fn opt(rule: Self) -> Self {
        Self::Optional(Box::new(rule))
    }

    /// `!rule then`
    #[must_use]
    pub fn not_followed_by(rule: Self, then: Self) -> Self {
        Self::Negation {
            rule: Box::new(rule),
            then: Box::new(then),
        }
    }

    #[must_use]
    pub fn reference(name: impl Into<CompactString>) -> Self {
        Self::Reference(name.into())
    }

    #[must_use]
    pub fn action(rule: Self) -> Self {
        Self::Action(Box::new(rule))
    }

    /// The empty sequence, which always matches without consuming input
    #[must_use]
    pub const fn empty() -> Self {
        Self::Sequence(Vec::new())
    }

    #[must_use]
    pub fn is_empty_sequence(&self) -> bool {
        matches!(self, Self::Sequence(rules) if rules.is_empty())
    }

    /// Names of the rules referenced anywhere in this rule, in order of first
    /// appearance
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Literal(_) | Self::CharRange { .. } | Self::Any => {}
            Self::Sequence(rules) | Self::Alternation(rules) => {
                for rule in rules {
                    rule.collect_references(names);
                }
            }
            Self::Repetition { rule, .. } | Self::Optional(rule) | Self::Action(rule) => {
                rule.collect_references(names);
            }
            Self::Negation { rule, then } => {
                rule.collect_references(names);
                then.collect_references(names);
            }
            Self::Reference(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
    }

    fn is_atom(&self) -> bool {
        match self {
            Self::Literal(_) | Self::CharRange { .. } | Self::Any | Self::Reference(_) => true,
            Self::Action(rule) => rule.is_atom(),
            _ => false,
        }
    }

    /// Write as an operand of a prefix or suffix operator
    fn fmt_atom(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_atom() {
            write!(f, "{self}")
        } else {
            write!(f, "({self})")
        }
    }

    /// Write as one element of a sequence
    fn fmt_element(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alternation(_) | Self::Sequence(_) => write!(f, "({self})"),
            Self::Negation { then, .. } if !then.is_empty_sequence() && !then.is_atom() => {
                write!(f, "({self})")
            }
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for GrammarRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write_quoted(f, value),
            Self::CharRange { from, to } => {
                write_quoted(f, from.encode_utf8(&mut [0; 4]))?;
                f.write_str("..")?;
                write_quoted(f, to.encode_utf8(&mut [0; 4]))
            }
            Self::Any => f.write_str("."),
            Self::Sequence(rules) if rules.is_empty() => f.write_str("()"),
            Self::Sequence(rules) => {
                for (i, rule) in rules.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    rule.fmt_element(f)?;
                    // `!x` with nothing after it must not capture the next element
                    if matches!(rule, Self::Negation { then, .. } if then.is_empty_sequence())
                        && i + 1 < rules.len()
                    {
                        f.write_str(" ()")?;
                    }
                }
                Ok(())
            }
            Self::Alternation(rules) => {
                for (i, rule) in rules.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    match rule {
                        Self::Alternation(_) => write!(f, "({rule})")?,
                        _ => write!(f, "{rule}")?,
                    }
                }
                Ok(())
            }
            Self::Repetition { rule, min, max } => match (min, max) {
                (0, None) => {
                    rule.fmt_atom(f)?;
                    f.write_str("*")
                }
                (1, None) => {
                    rule.fmt_atom(f)?;
                    f.write_str("+")
                }
                (0, Some(1)) => {
                    rule.fmt_atom(f)?;
                    f.write_str("?")
                }
                (min, max) => fmt_bounded(f, rule, *min, *max),
            },
            Self::Optional(rule) => {
                rule.fmt_atom(f)?;
                f.write_str("?")
            }
            Self::Negation { rule, then } => {
                f.write_str("!")?;
                rule.fmt_atom(f)?;
                if !then.is_empty_sequence() {
                    f.write_str(" ")?;
                    then.fmt_element(f)?;
                }
                Ok(())
            }
            Self::Reference(name) => f.write_str(name),
            Self::Action(rule) => write!(f, "{rule}"),
        }
    }
}

/// Spell out `rule{min,max}` with the operators the dialect has
fn fmt_bounded(
    f: &mut fmt::Formatter<'_>,
    rule: &GrammarRule,
    min: usize,
    max: Option<usize>,
) -> fmt::Result {
    let optional = max.map(|max| max.saturating_sub(min));
    let mut parts = 0;
    let mut separate = |f: &mut fmt::Formatter<'_>| {
        parts += 1;
        if parts > 1 { f.write_str(" ") } else { Ok(()) }
    };

    f.write_str("(")?;
    for _ in 0..min {
        separate(f)?;
        rule.fmt_atom(f)?;
    }
    match optional {
        None => {
            separate(f)?;
            rule.fmt_atom(f)?;
            f.write_str("*")?;
        }
        Some(count) => {
            for _ in 0..count {
                separate(f)?;
                rule.fmt_atom(f)?;
                f.write_str("?")?;
            }
        }
    }
    f.write_str(")")
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in value.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("'")
}
