//! Tests for the parser core: primitives, combinators and error reporting

use pegloom::parser::{
    alt, any_char, between, char, choice, eof, integer, lazy, letter, literal, many, many1, map,
    not, optional, preceded, quoted_string, regex, sep_by, seq, terminated, token, whitespace,
};
use pegloom::{ParseConfig, ParseContext, ParseError, Parser};

#[test]
fn test_ordered_choice_keeps_first_success() {
    let parser = alt(literal("a"), literal("ab"));
    let success = parser.parse("ab", 0).unwrap();
    assert_eq!(success.value, "a");
    assert_eq!(success.pos, 1);
    assert!(parser.parse_all("ab").is_err());
}

#[test]
fn test_many_optional_terminates() {
    let parser = many(optional(char('a')));
    for input in ["", "a", "aaab", "bbbb"] {
        assert!(parser.parse(input, 0).is_ok());
    }
}

#[test]
fn test_sep_by_integer_on_empty_input() {
    let success = sep_by(integer(), char(',')).parse("", 0).unwrap();
    assert_eq!(success.value, Vec::<i64>::new());
    assert_eq!(success.pos, 0);
}

#[test]
fn test_parse_error_format() {
    let parser = seq(literal("let"), preceded(whitespace(), letter()));
    let error = parser.parse_all("let\n  1").unwrap_err();
    assert_eq!(
        error.to_string(),
        "Parse error at line 2, col 3: expected letter"
    );
}

#[test]
fn test_leftover_input_is_an_error() {
    let error = integer().parse_all("12abc").unwrap_err();
    assert_eq!(error.offset(), 2);
    assert_eq!(error.expected().unwrap().to_string(), "end of input");
}

#[test]
fn test_tracked_parse_reports_deepest_branch() {
    // `optional` recovers from the deeper failure, so only tracking sees it
    let parser = terminated(
        optional(seq(literal("ab"), literal("cd"))),
        literal("x"),
    );
    let untracked = parser.parse_all("abz").unwrap_err();
    assert_eq!(untracked.offset(), 0);

    let tracked = parser.parse_all_tracked("abz").unwrap_err();
    assert_eq!(tracked.offset(), 2);
    assert_eq!(tracked.expected().unwrap().to_string(), "'cd'");
}

#[test]
fn test_json_like_values_with_lazy() {
    #[derive(Debug, PartialEq)]
    enum Value {
        Number(i64),
        Text(String),
        List(Vec<Value>),
    }

    fn value() -> Parser<Value> {
        token(choice(vec![
            map(integer(), Value::Number),
            map(quoted_string(), Value::Text),
            map(
                between(char('['), sep_by(lazy(value), char(',')), char(']')),
                Value::List,
            ),
        ]))
    }

    let parsed = value().parse_all(r#" [1, "two", [ -3 ], []] "#).unwrap();
    assert_eq!(
        parsed,
        Value::List(vec![
            Value::Number(1),
            Value::Text("two".into()),
            Value::List(vec![Value::Number(-3)]),
            Value::List(vec![]),
        ])
    );
}

#[test]
fn test_lazy_depth_limit() {
    fn nested() -> Parser<()> {
        alt(
            map(between(char('('), lazy(nested), char(')')), |()| ()),
            map(char('x'), |_| ()),
        )
    }

    let deep = format!("{}x{}", "(".repeat(40), ")".repeat(40));
    let config = ParseConfig::default().with_max_depth(16);
    let error = nested()
        .parse_all_with(ParseContext::with_config(&deep, config))
        .unwrap_err();
    assert!(matches!(error, ParseError::RecursionLimit { limit: 16, .. }));

    assert!(nested().parse_all(&deep).is_ok());
}

#[test]
fn test_depth_limited_branch_yields_to_later_alternative() {
    fn closed() -> Parser<()> {
        map(between(char('('), optional(lazy(closed)), char(')')), |_| ())
    }

    let parser = alt(closed(), map(many(any_char()), |_| ()));
    let input = "((((x";
    let config = ParseConfig::default().with_max_depth(2);

    let mut ctx = ParseContext::with_config(input, config);
    let partial = parser.run(&mut ctx, 0).unwrap();
    assert_eq!(partial.pos, input.len());
    assert!(ctx.limit_exceeded_at().is_some());

    assert!(
        parser
            .parse_all_with(ParseContext::with_config(input, config))
            .is_ok()
    );
}

#[test]
fn test_keyword_boundary_with_not() {
    let keyword = terminated(literal("if"), not(letter()));
    assert!(keyword.parse("if x", 0).is_ok());
    assert!(keyword.parse("iffy", 0).is_err());
}

#[test]
fn test_regex_primitive_in_sequence() {
    let ident = regex("[A-Za-z_][A-Za-z0-9_]*").unwrap();
    let assignment = seq(terminated(token(ident), char('=')), token(integer()));
    let (name, value) = assignment.parse_all(" answer = 42").unwrap();
    assert_eq!(name, "answer");
    assert_eq!(value, 42);
}

#[test]
fn test_many1_and_eof() {
    let word = terminated(many1(letter()), eof());
    assert_eq!(word.parse_all("abc").unwrap().len(), 3);
    assert!(word.parse("", 0).is_err());
}

#[test]
fn test_format_with_context() {
    let source = "first line\nsecond lime";
    let parser = seq(literal("first line\nsecond li"), literal("ne"));
    let error = parser.parse_all(source).unwrap_err();
    let rendered = error.format_with_context(source);
    assert!(rendered.starts_with("Parse error at line 2, col 10: expected 'ne'"));
    assert!(rendered.contains("2 | second lime"));
    assert!(rendered.ends_with("|          ^"));
}
