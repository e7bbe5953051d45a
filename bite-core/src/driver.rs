//! Entry points running a grammar over complete or streaming input.
//!
//! # Incremental state machine
//!
//! ```text
//!            +-----------------------------------------------+
//!            v                                               |
//!   AwaitingInput --(eof)--> Done                            |
//!            |                                               |
//!            +--> parse --(ok)--> yield tree --> drop end_loc, peek
//!                    |
//!                    +--(err)--> yield error --> Failed
//! ```
//!
//! `Done` and `Failed` are terminal; the iterator is fused.

use std::iter::FusedIterator;

use crate::buffer::{ByteRange, BytesBuffer, ParserBuffer, StreamBuffer};
use crate::error::ParseError;
use crate::node::Node;
use crate::parser::Parser;
use crate::source::ByteSource;

/// Parse `data` once from offset 0.
///
/// With `parse_all`, input left over after the tree is a `TrailingBytes`
/// error.
pub fn parse_bytes(grammar: &Parser, data: &[u8], parse_all: bool) -> Result<Node, ParseError> {
    let node = grammar.parse(&mut BytesBuffer::new(data), 0)?;
    if parse_all && node.end_loc() < data.len() {
        return Err(ParseError::TrailingBytes {
            end_loc: node.end_loc(),
            len: data.len(),
        });
    }
    Ok(node)
}

/// Parse `source` as a stream of back-to-back `grammar` matches.
pub fn parse_incremental<S: ByteSource>(grammar: &Parser, source: S) -> Incremental<S> {
    Incremental {
        grammar: grammar.clone(),
        buffer: StreamBuffer::new(source),
        consumed: None,
        state: State::AwaitingInput,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingInput,
    Done,
    Failed,
}

/// Iterator over the trees of an incremental parse.
///
/// Yields one tree per grammar match, or a single error after which
/// nothing more is produced.
#[derive(Debug)]
pub struct Incremental<S> {
    grammar: Parser,
    buffer: StreamBuffer<S>,
    /// Width of the last yielded tree, dropped on the next call.
    consumed: Option<usize>,
    state: State,
}

impl<S: ByteSource> Incremental<S> {
    /// The underlying buffer, e.g. to inspect unconsumed bytes after a failure.
    pub fn buffer(&self) -> &StreamBuffer<S> {
        &self.buffer
    }

    fn fail(&mut self, err: ParseError) -> Option<Result<Node, ParseError>> {
        log_debug!("incremental parse failed: {}", err);
        self.state = State::Failed;
        Some(Err(err))
    }

    /// Discard the last tree's bytes and peek one byte so the source can
    /// observe end of data.
    fn drain(&mut self) -> Result<(), ParseError> {
        if let Some(consumed) = self.consumed.take() {
            if consumed == 0 && !self.buffer.get_current().is_empty() {
                return Err(ParseError::NoProgress);
            }
            self.buffer.drop_prefix(consumed)?;
        }
        self.buffer.get(ByteRange::window(0, 1))?;
        Ok(())
    }
}

impl<S: ByteSource> Iterator for Incremental<S> {
    type Item = Result<Node, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state != State::AwaitingInput {
            return None;
        }
        if let Err(err) = self.drain() {
            return self.fail(err);
        }
        if self.buffer.at_eof() {
            log_trace!("incremental parse reached end of input");
            self.state = State::Done;
            return None;
        }

        match self.grammar.parse(&mut self.buffer, 0) {
            Ok(node) => {
                log_trace!("incremental parse matched {} bytes", node.end_loc());
                self.consumed = Some(node.end_loc());
                Some(Ok(node))
            }
            Err(err) => self.fail(err),
        }
    }
}

impl<S: ByteSource> FusedIterator for Incremental<S> {}
