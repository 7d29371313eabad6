//! # Grammar Module
//!
//! Textual PEG grammars: the rule representation, the definition parser,
//! static validation, and compilation into parsers.
//!
//! ## Overview
//!
//! A grammar goes through three stages:
//!
//! - **Parsing**: [`parse_grammar_def`] turns definition text into a
//!   [`RuleMap`] of [`GrammarRule`] trees
//! - **Validation**: [`validate_grammar`] rejects undefined references and
//!   left recursion, which recursive descent cannot handle
//! - **Building**: [`GrammarBuilder`] compiles the rules into a [`Grammar`]
//!   that parses input into [`ParseNode`] trees
//!
//! [`compile`] runs all three.
//!
//! ## Usage
//!
//! ```rust
//! use pegloom::compile;
//!
//! let grammar = compile(r#"
//!     list  = '[' ws (item (ws ',' ws item)*)? ws ']'
//!     item  = '0'..'9'+ | list
//!     ws    = (' ' | '\n')*
//! "#).unwrap();
//!
//! let tree = grammar.parse_all("[1, [2, 3], 4]").unwrap();
//! assert_eq!(tree.find_all_rules("item").len(), 3);
//! ```

mod builder;
mod def;
mod node;
mod rule;
mod validate;

pub use builder::{Grammar, GrammarBuilder, build_parser, compile};
pub use def::{MAX_GROUP_NESTING, parse_grammar_def};
pub use node::{ParseNode, Span};
pub use rule::{GrammarRule, RuleMap};
pub use validate::{detect_left_recursion, left_recursive_cycles, validate_grammar, validate_references};
