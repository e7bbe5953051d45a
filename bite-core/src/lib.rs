//! bite core
//!
//! Byte-oriented parser combinators for binary formats and byte-level text
//! protocols. Grammars are built once from small parsers and evaluated
//! against random-access buffers, over complete data or blocking streams.
//!
//! # Architecture
//!
//! - **source.rs** - `ByteSource` trait, slice and `io::Read` adapters
//! - **buffer.rs** - `ByteRange`, `ParserBuffer`, static and stream buffers
//! - **parser.rs** - Primitives, combinators, composition builders
//! - **transform.rs** - Lazy value transforms (`Suppress`, `Group`, ...)
//! - **node.rs** - Parse tree nodes and value flattening
//! - **value.rs** - Value types
//! - **driver.rs** - One-shot and incremental entry points
//! - **error.rs** - `ParseError`, `ValueError`
//!
//! # Example
//!
//! ```
//! use bite_core::{character_set, fixed_byte_count, literal, parse_bytes};
//!
//! let header = literal(b"ID").then(character_set(b"0123456789")).then(fixed_byte_count(2));
//! let node = parse_bytes(&header, b"ID7xy", true).unwrap();
//! assert_eq!(node.values().unwrap().len(), 3);
//! ```

#[macro_use]
mod logging;

pub mod buffer;
pub mod driver;
pub mod error;
pub mod node;
pub mod parser;
pub mod source;
pub mod transform;
pub mod value;

pub use buffer::{ByteRange, BytesBuffer, ParserBuffer, StreamBuffer};
pub use driver::{parse_bytes, parse_incremental, Incremental};
pub use error::{ParseError, ValueError};
pub use node::{Node, NodeKind};
pub use parser::{
    and, caseless_literal, character_set, combine, counted, exactly, first_of, fixed_byte_count,
    forward, inverted_character_set, literal, match_first, not, one_or_more, opt, repeat, repeated,
    sequence, zero_or_more, Parser, ParserKind,
};
pub use source::{ByteSource, ReadSource, SliceSource};
pub use transform::{group, only_value, suppress, transform, transform_values, Transform};
pub use value::Value;
