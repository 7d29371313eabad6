#![no_main]
use libfuzzer_sys::fuzz_target;
use pegloom::compile;

// The first line is the grammar, the rest is input for it
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (source, input) = text.split_once('\n').unwrap_or((text, ""));

    if let Ok(grammar) = compile(source) {
        if let Err(error) = grammar.parse_all(input) {
            let _ = error.format_with_context(input);
        }
    }
});
