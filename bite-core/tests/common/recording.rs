//! A byte source that remembers how it was read.

use std::io;

use bite_core::{ByteSource, SliceSource};

/// Wraps a [`SliceSource`], logging the size of every read request.
pub struct RecordingSource {
    inner: SliceSource,
    pub reads: Vec<usize>,
    pub reads_to_end: usize,
}

impl RecordingSource {
    pub fn new(data: &[u8]) -> Self {
        Self {
            inner: SliceSource::new(data.to_vec()),
            reads: Vec::new(),
            reads_to_end: 0,
        }
    }

    /// Bytes handed out so far.
    pub fn position(&self) -> usize {
        self.inner.position()
    }
}

impl ByteSource for RecordingSource {
    fn read(&mut self, max_n: usize) -> io::Result<Vec<u8>> {
        self.reads.push(max_n);
        self.inner.read(max_n)
    }

    fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        self.reads_to_end += 1;
        self.inner.read_to_end()
    }

    fn at_eof(&self) -> bool {
        self.inner.at_eof()
    }
}
