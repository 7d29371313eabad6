//! Compile a JSON grammar from its textual definition and walk the parse tree.
//!
//! Run with `RUST_LOG=debug` to see the grammar pipeline log.

use pegloom::{GrammarError, compile};

const JSON: &str = r#"
    // A document is a single value
    value  = ws (object | array | string | number | 'true' | 'false' | 'null') ws
    object = '{' ws (member (',' member)*)? ws '}'
    member = ws string ws ':' value
    array  = '[' ws (value (',' value)*)? ws ']'
    string = '"' (!'"' .)* '"'
    number = '-'? '0'..'9'+ ('.' '0'..'9'+)?
    ws     = (' ' | '\t' | '\n' | '\r')*
"#;

const DOCUMENT: &str = r#"{
    "name": "pegloom",
    "tags": ["peg", "parser"],
    "version": 1.0,
    "stable": false
}"#;

const BROKEN: &str = r#"{
    "name": "pegloom",
    "tags": ["peg" "parser"]
}"#;

fn main() -> Result<(), GrammarError> {
    env_logger::init();

    let grammar = compile(JSON)?;
    println!("Rules: {}", grammar.rule_names().collect::<Vec<_>>().join(", "));

    match grammar.parse_all(DOCUMENT) {
        Ok(tree) => {
            for member in tree.find_all_rules("member") {
                if let Some(key) = member.find_rule("string") {
                    println!("key {} at {:?}", key.text(), key.span());
                }
            }
            println!("{} numbers", tree.find_all_rules("number").len());
        }
        Err(error) => println!("{error}"),
    }

    if let Err(error) = grammar.parse_all(BROKEN) {
        println!("{}", error.format_with_context(BROKEN));
    }

    Ok(())
}
