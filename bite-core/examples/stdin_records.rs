//! Split length-prefixed records (`[n]` then `n` bytes) read from stdin.
//!
//! printf '[3]abc[5]hello' | cargo run --example stdin_records

use std::io;

use bite_core::{
    and, character_set, combine, counted, fixed_byte_count, literal, one_or_more,
    parse_incremental, suppress, transform_values, ReadSource, Value, ValueError,
};

fn main() {
    let count = transform_values(
        and([
            suppress(literal(b"[")),
            combine(one_or_more(character_set(b"0123456789"))),
            suppress(literal(b"]")),
        ]),
        |values| {
            values
                .iter()
                .map(|v| {
                    let text = v.as_bytes().and_then(|b| std::str::from_utf8(b).ok());
                    text.and_then(|s| s.parse().ok())
                        .map(Value::Integer)
                        .ok_or(ValueError::ExpectedCount)
                })
                .collect()
        },
    )
    .named("count");
    let record = counted(count, fixed_byte_count).named("record");

    for tree in parse_incremental(&record, ReadSource::new(io::stdin().lock())) {
        match tree {
            Ok(tree) => {
                let payload = tree.value().unwrap();
                eprintln!(
                    "RECORD {}..{}: {:?}",
                    tree.start_loc(),
                    tree.end_loc(),
                    payload.as_bytes().unwrap().escape_ascii().to_string()
                );
            }
            Err(err) => {
                eprintln!("ERROR: {err}");
                std::process::exit(1);
            }
        }
    }
}
