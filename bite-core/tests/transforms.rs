//! Lazily applied value transforms.

mod common;

use bite_core::{
    character_set, fixed_byte_count, group, literal, one_or_more, only_value, parse_bytes,
    sequence, suppress, transform, transform_values, Node, NodeKind, Value, ValueError,
};
use common::parse_after_prefix;
use pretty_assertions::assert_eq;

fn big_endian(values: Vec<Value>) -> Result<Vec<Value>, ValueError> {
    values
        .into_iter()
        .map(|v| {
            let bytes = v.into_bytes().ok_or(ValueError::ExpectedBytes)?;
            let n = bytes.iter().fold(0i64, |acc, &b| (acc << 8) | i64::from(b));
            Ok(Value::Integer(n))
        })
        .collect()
}

#[test]
fn transform_sees_the_whole_node() {
    let grammar = transform(one_or_more(literal(b"ab")), |node: &Node| match node.kind() {
        NodeKind::Sequence { children, .. } => Ok(vec![Value::Integer(children.len() as i64)]),
        _ => Err(ValueError::Custom("not a sequence".into())),
    });
    let node = parse_after_prefix(&grammar, b"ababx").unwrap();
    assert_eq!((node.start_loc(), node.end_loc()), (4, 8));
    assert_eq!(node.value(), Ok(Value::Integer(2)));
}

#[test]
fn transform_values_maps_flattened_values() {
    let grammar = transform_values(fixed_byte_count(2), big_endian);
    let node = parse_bytes(&grammar, b"\x01\x02", true).unwrap();
    assert_eq!(node.value(), Ok(Value::Integer(0x0102)));
}

#[test]
fn suppress_consumes_without_values() {
    let grammar = sequence([
        suppress(literal(b"<")),
        character_set(b"xyz"),
        suppress(literal(b">")),
    ]);
    let node = parse_after_prefix(&grammar, b"<y>").unwrap();
    assert_eq!((node.start_loc(), node.end_loc()), (4, 7));
    assert_eq!(node.values(), Ok(vec![Value::from(b"y")]));
}

#[test]
fn group_of_nothing_is_empty_tuple() {
    let grammar = group(suppress(literal(b"-")));
    let node = parse_bytes(&grammar, b"-", true).unwrap();
    assert_eq!(node.values(), Ok(vec![Value::Tuple(vec![])]));
}

#[test]
fn only_value_is_checked_when_values_are_read() {
    let grammar = only_value(sequence([literal(b"a"), literal(b"b")]));
    // Parsing itself succeeds; the violation is local to the values.
    let node = parse_bytes(&grammar, b"ab", true).unwrap();
    assert_eq!(node.width(), 2);
    assert_eq!(node.values(), Err(ValueError::ExpectedSingleValue { count: 2 }));

    let node = parse_bytes(&only_value(suppress(literal(b"a"))), b"a", true).unwrap();
    assert_eq!(node.value(), Err(ValueError::ExpectedSingleValue { count: 0 }));
}

#[test]
fn user_errors_surface_from_values() {
    let grammar = transform_values(literal(b"?"), |_| {
        Err(ValueError::Custom("unsupported".into()))
    });
    let node = parse_bytes(&grammar, b"?", true).unwrap();
    let err = node.values().unwrap_err();
    assert_eq!(err.to_string(), "unsupported");
}

#[test]
fn transforms_nest() {
    let grammar = group(transform_values(one_or_more(fixed_byte_count(2)), big_endian));
    let node = parse_bytes(&grammar, b"\x00\x01\x00\x02", true).unwrap();
    assert_eq!(
        node.values(),
        Ok(vec![Value::Tuple(vec![Value::Integer(1), Value::Integer(2)])])
    );
}
