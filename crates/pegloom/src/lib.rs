//! # Pegloom
//!
//! A parser-combinator library with a textual PEG grammar compiler on top.
//!
//! ## Overview
//!
//! Pegloom has two layers:
//!
//! - **Parser core** ([`parser`]): immutable, composable [`Parser`] values
//!   built from primitives (`literal`, `char_range`, `regex`, ...) and
//!   combinators (`seq`, `alt`, `many`, `not`, `lazy`, ...). Choice is ordered
//!   and failures are values, so alternatives backtrack freely.
//! - **Grammars** ([`grammar`]): a PEG dialect parsed by the core itself,
//!   checked for undefined references and left recursion, and compiled into a
//!   [`Grammar`] producing [`ParseNode`] trees.
//!
//! Errors report the furthest offset any alternative reached, rendered as
//! `Parse error at line L, col C: expected ...`.
//!
//! ## Quick Start
//!
//! Combinators:
//!
//! ```rust
//! use pegloom::parser::{char, integer, sep_by, token, between};
//!
//! let list = between(char('['), sep_by(token(integer()), char(',')), char(']'));
//! assert_eq!(list.parse_all("[1, 2, -3]").unwrap(), vec![1, 2, -3]);
//! ```
//!
//! Grammars:
//!
//! ```rust
//! use pegloom::compile;
//!
//! let grammar = compile(r#"
//!     sum    = number ('+' number)*
//!     number = '0'..'9'+
//! "#).unwrap();
//!
//! let tree = grammar.parse_all("1+22+333").unwrap();
//! assert_eq!(tree.find_all_rules("number").len(), 3);
//!
//! let error = grammar.parse_all("1+").unwrap_err();
//! assert_eq!(error.to_string(), "Parse error at line 1, col 3: expected '0'..'9'");
//! ```
//!
//! ## Feature Flags
//!
//! - `diagnostics`: derive `miette::Diagnostic` for the error types
//! - `serialize`: serde support for [`GrammarRule`], [`ParseNode`] and [`Expected`]

pub mod error;
pub mod grammar;
pub mod line_col;
pub mod parser;

pub use error::{GrammarError, ParseError};
pub use grammar::{
    Grammar, GrammarBuilder, GrammarRule, ParseNode, RuleMap, Span, build_parser, compile,
    parse_grammar_def,
};
pub use parser::{Expected, Failure, ParseConfig, ParseContext, ParseResult, Parser, Success};
