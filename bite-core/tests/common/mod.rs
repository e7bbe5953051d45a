//! Shared helpers for the bite-core integration tests.
//!
//! Provides an instrumented byte source, seeded input generation and the
//! length-prefixed record grammar.

#![allow(dead_code)]

mod generators;
mod grammars;
mod recording;

pub use generators::Gen;
pub use grammars::{bracketed_count, bracketed_record, decimal};
pub use recording::RecordingSource;

use bite_core::{BytesBuffer, Node, ParseError, Parser};

/// Parse `input` with a four byte prefix so absolute offsets get exercised.
pub fn parse_after_prefix(grammar: &Parser, input: &[u8]) -> Result<Node, ParseError> {
    let mut data = b"foo ".to_vec();
    data.extend_from_slice(input);
    grammar.parse(&mut BytesBuffer::new(&data), 4)
}
