use criterion::{Criterion, criterion_group, criterion_main};
use pegloom::parser::{
    between, char, choice, float, lazy, map, quoted_string, sep_by, seq, token,
};
use pegloom::{Grammar, Parser, compile};
use std::hint::black_box;

const ARITHMETIC: &str = r"
    expr   = ws term (ws ('+' | '-') ws term)* ws
    term   = factor (ws ('*' | '/') ws factor)*
    factor = number | '(' expr ')'
    number = '-'? '0'..'9'+
    ws     = (' ' | '\t' | '\n')*
";

fn arithmetic_input(terms: usize) -> String {
    (0..terms)
        .map(|i| format!("({i} * {} - 7)", i + 1))
        .collect::<Vec<_>>()
        .join(" + ")
}

#[derive(Debug)]
#[allow(dead_code)]
enum Value {
    Number(f64),
    Text(String),
    List(Vec<Value>),
    Object(Vec<(String, Value)>),
}

fn json_like() -> Parser<Value> {
    let list = map(
        between(char('['), sep_by(lazy(json_like), char(',')), token(char(']'))),
        Value::List,
    );
    let member = map(
        seq(token(quoted_string()), seq(char(':'), lazy(json_like))),
        |(key, (_, value))| (key, value),
    );
    let object = map(
        between(char('{'), sep_by(member, char(',')), token(char('}'))),
        Value::Object,
    );
    token(choice(vec![
        map(float(), Value::Number),
        map(quoted_string(), Value::Text),
        list,
        object,
    ]))
}

fn json_input(items: usize) -> String {
    let items: Vec<String> = (0..items)
        .map(|i| format!(r#"{{"id": {i}, "name": "item {i}", "tags": [1.5, 2e3, "x"]}}"#))
        .collect();
    format!("[{}]", items.join(", "))
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_arithmetic_grammar", |b| {
        b.iter(|| compile(black_box(ARITHMETIC)).unwrap());
    });
}

fn bench_grammar_parse(c: &mut Criterion) {
    let grammar: Grammar = ARITHMETIC.parse().unwrap();
    let small = arithmetic_input(4);
    let large = arithmetic_input(200);

    c.bench_function("grammar_parse_small", |b| {
        b.iter(|| grammar.parse_all(black_box(&small)).unwrap());
    });
    c.bench_function("grammar_parse_large", |b| {
        b.iter(|| grammar.parse_all(black_box(&large)).unwrap());
    });
}

fn bench_combinators(c: &mut Criterion) {
    let parser = json_like();
    let input = json_input(100);

    c.bench_function("combinator_json_like", |b| {
        b.iter(|| parser.parse_all(black_box(&input)).unwrap());
    });
    c.bench_function("combinator_json_like_tracked", |b| {
        b.iter(|| parser.parse_all_tracked(black_box(&input)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_compile,
    bench_grammar_parse,
    bench_combinators
);
criterion_main!(benches);
