//! Property-based tests for the parser core and the grammar compiler
//!
//! These tests use proptest to generate random inputs and verify that
//! parsers never move backwards, terminate, and agree with their printed form.

#![cfg(test)]

use pegloom::grammar::MAX_GROUP_NESTING;
use pegloom::parser::{
    alt, between, char, char_range, choice, integer, literal, many, many1, map, not, optional,
    recognize, sep_by, seq, token,
};
use pegloom::{GrammarRule, Parser, compile, parse_grammar_def};
use proptest::prelude::*;

/// A handful of parsers covering every combinator shape
fn sample_parsers() -> Vec<Parser<String>> {
    let word = recognize(many1(char_range('a', 'z')));
    vec![
        literal("ab"),
        word.clone(),
        recognize(many(optional(char('a')))),
        recognize(seq(word.clone(), optional(char('!')))),
        choice(vec![literal("abc"), literal("ab"), literal("a")]),
        recognize(sep_by(word, char(','))),
        recognize(seq(not(char('x')), many(alt(char('a'), char('b'))))),
        map(integer(), |n| n.to_string()),
    ]
}

/// Short strings over a small alphabet so parsers actually match something
fn small_input() -> impl Strategy<Value = String> {
    "[abcx,!0-9 -]{0,24}"
}

fn literal_text() -> impl Strategy<Value = String> {
    "[a-z0-9 '\\\\\t\n.|*()]{0,8}"
}

proptest! {
    #[test]
    fn successful_parses_never_move_backwards(input in small_input(), start in 0usize..24) {
        // Inputs are ASCII, so every offset is a char boundary
        let start = start.min(input.len());
        for parser in sample_parsers() {
            if let Ok(success) = parser.parse(&input, start) {
                prop_assert!(success.pos >= start);
                prop_assert!(success.pos <= input.len());
            }
        }
    }

    #[test]
    fn failures_stay_within_input(input in small_input()) {
        for parser in sample_parsers() {
            if let Err(failure) = parser.parse(&input, 0) {
                prop_assert!(failure.pos <= input.len());
                prop_assert!(!failure.expected.is_empty());
            }
        }
    }

    #[test]
    fn many_of_optional_terminates(input in "a{0,16}[bc]{0,4}") {
        let parser = many(optional(char('a')));
        let success = parser.parse(&input, 0).unwrap();
        let run = input.chars().take_while(|&c| c == 'a').count();
        prop_assert_eq!(success.pos, run);
    }

    #[test]
    fn integer_lists_parse_back(numbers in proptest::collection::vec(any::<i32>(), 0..16)) {
        let text = format!(
            "[{}]",
            numbers.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        );
        let list = between(char('['), sep_by(token(integer()), char(',')), char(']'));
        let parsed = list.parse_all(&text).unwrap();
        let expected: Vec<i64> = numbers.into_iter().map(i64::from).collect();
        prop_assert_eq!(parsed, expected);
    }

    #[test]
    fn printed_rules_parse_back(
        branches in proptest::collection::vec(
            proptest::collection::vec(literal_text(), 1..4),
            1..4,
        )
    ) {
        let rule = GrammarRule::choice(branches.into_iter().map(|branch| {
            GrammarRule::seq(branch.into_iter().map(GrammarRule::literal))
        }));
        let source = format!("start = {rule}");
        let rules = parse_grammar_def(&source).unwrap();
        prop_assert_eq!(&rules["start"], &rule);
    }

    #[test]
    fn grammar_definitions_never_panic(source in "\\PC{0,64}") {
        let _ = parse_grammar_def(&source);
    }

    #[test]
    fn deeply_grouped_definitions_fail_cleanly(depth in 0usize..2000, unclosed in any::<bool>()) {
        let closing = if unclosed { String::new() } else { ")".repeat(depth) };
        let source = format!("r = {}'x'{closing}", "(".repeat(depth));
        let balanced = !unclosed || depth == 0;
        prop_assert_eq!(
            parse_grammar_def(&source).is_ok(),
            balanced && depth <= MAX_GROUP_NESTING
        );
    }

    #[test]
    fn compiled_grammars_accept_their_literal(word in "[a-z]{1,12}") {
        let grammar = compile(&format!("start = '{word}' !.")).unwrap();
        prop_assert!(grammar.parse_all(&word).is_ok());
        let longer = format!("{word}z");
        prop_assert!(grammar.parse_all(&longer).is_err());
    }
}
