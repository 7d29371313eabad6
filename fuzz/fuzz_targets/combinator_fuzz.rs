#![no_main]
use libfuzzer_sys::fuzz_target;
use pegloom::Parser;
use pegloom::parser::{
    between, char, choice, float, lazy, map, quoted_string, sep_by, token,
};

fn value() -> Parser<()> {
    token(choice(vec![
        map(float(), |_| ()),
        map(quoted_string(), |_| ()),
        map(
            between(char('['), sep_by(lazy(value), char(',')), token(char(']'))),
            |_| (),
        ),
    ]))
}

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let parser = value();
    if let Ok(success) = parser.parse(input, 0) {
        assert!(success.pos <= input.len());
        assert!(input.is_char_boundary(success.pos));
    }
    let _ = parser.parse_all_tracked(input);
});
