//! Grammars shared across the suites.

use bite_core::{
    and, character_set, combine, counted, fixed_byte_count, literal, one_or_more, suppress,
    transform_values, Parser, Value, ValueError,
};

/// Decode every byte value as a decimal integer.
pub fn decimal(values: Vec<Value>) -> Result<Vec<Value>, ValueError> {
    values
        .into_iter()
        .map(|value| {
            let digits = value.into_bytes().ok_or(ValueError::ExpectedBytes)?;
            std::str::from_utf8(&digits)
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Value::Integer)
                .ok_or_else(|| ValueError::Custom(format!("not a decimal: {digits:?}")))
        })
        .collect()
}

/// `[n]`, valued as the integer `n`.
pub fn bracketed_count() -> Parser {
    let digits = combine(one_or_more(character_set(b"0123456789")));
    transform_values(
        and([suppress(literal(b"[")), digits, suppress(literal(b"]"))]),
        decimal,
    )
}

/// `[n]` followed by `n` arbitrary payload bytes.
pub fn bracketed_record() -> Parser {
    counted(bracketed_count(), fixed_byte_count)
}
