//! Random-access byte buffers over static and streaming input.
//!
//! Grammars address input through [`ParserBuffer`] with absolute offsets.
//! [`BytesBuffer`] resolves every range immediately; [`StreamBuffer`] pulls
//! from a [`ByteSource`] just enough to resolve the range it is asked for.
//!
//! # Range resolution
//!
//! ```text
//! ByteRange                  needed from stream       "0123456789"
//! Index(2)                   3 bytes                  "2"
//! Index(-2)                  everything               "8"
//! Slice(2..5)                5 bytes                  "234"
//! Slice(6..None, step -2)    7 bytes                  "6420"
//! Slice(None..2, step -2)    everything               "9753"
//! ```

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::error::ParseError;
use crate::source::{short_read, ByteSource};

/// An address into a buffer: one index or a (possibly strided) slice.
///
/// Negative positions count back from the end of the input, which for a
/// live stream means the end of everything it will ever deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    Index(isize),
    Slice {
        start: Option<isize>,
        stop: Option<isize>,
        step: isize,
    },
}

impl ByteRange {
    #[inline]
    pub fn index(i: isize) -> Self {
        Self::Index(i)
    }

    #[inline]
    pub fn slice(start: Option<isize>, stop: Option<isize>) -> Self {
        Self::Slice {
            start,
            stop,
            step: 1,
        }
    }

    /// A slice taking every `step`-th byte.
    ///
    /// # Panics
    ///
    /// Panics if `step` is zero.
    pub fn strided(start: Option<isize>, stop: Option<isize>, step: isize) -> Self {
        assert!(step != 0, "ByteRange step must be non-zero");
        Self::Slice { start, stop, step }
    }

    /// Zero-width window at `loc`.
    #[inline]
    pub fn empty_at(loc: usize) -> Self {
        Self::from(loc..loc)
    }

    /// Window of `len` bytes starting at `loc`.
    ///
    /// The end saturates, so an oversized window stays forward-bounded and
    /// resolves to a short read instead of an open range.
    #[inline]
    pub fn window(loc: usize, len: usize) -> Self {
        Self::from(loc..loc.saturating_add(len))
    }

    /// Bytes a stream must have delivered to resolve this range.
    ///
    /// `None` means the whole stream: the range depends on where it ends.
    pub fn required_len(&self) -> Option<usize> {
        match *self {
            Self::Index(i) => usize::try_from(i).ok().map(|i| i + 1),
            Self::Slice { start, stop, step } => {
                if start.is_some_and(|s| s < 0) || stop.is_some_and(|s| s < 0) {
                    return None;
                }
                if step > 0 {
                    stop.map(|s| s as usize)
                } else {
                    start.map(|s| s as usize + 1)
                }
            }
        }
    }

    /// Select the addressed bytes out of `data`.
    ///
    /// Out-of-range positions are clamped, never an error.
    pub fn resolve(&self, data: &[u8]) -> Vec<u8> {
        let len = data.len() as isize;
        match *self {
            Self::Index(i) => {
                let i = if i < 0 { i + len } else { i };
                if (0..len).contains(&i) {
                    vec![data[i as usize]]
                } else {
                    Vec::new()
                }
            }
            Self::Slice { start, stop, step } if step > 0 => {
                let start = clamp_forward(start.unwrap_or(0), len);
                let stop = clamp_forward(stop.unwrap_or(len), len);
                if start >= stop {
                    return Vec::new();
                }
                data[start as usize..stop as usize]
                    .iter()
                    .step_by(step as usize)
                    .copied()
                    .collect()
            }
            Self::Slice { start, stop, step } => {
                let start = start.map_or(len - 1, |s| clamp_backward(s, len));
                let stop = stop.map_or(-1, |s| clamp_backward(s, len));
                let mut out = Vec::new();
                let mut i = start;
                while i > stop {
                    out.push(data[i as usize]);
                    i += step;
                }
                out
            }
        }
    }
}

/// Offsets past `isize::MAX` cannot be addressed anyway; saturate rather
/// than wrap into a negative, end-relative position.
#[inline]
fn offset(pos: usize) -> isize {
    isize::try_from(pos).unwrap_or(isize::MAX)
}

fn clamp_forward(pos: isize, len: isize) -> isize {
    if pos < 0 {
        (pos + len).max(0)
    } else {
        pos.min(len)
    }
}

fn clamp_backward(pos: isize, len: isize) -> isize {
    if pos < 0 {
        (pos + len).max(-1)
    } else {
        pos.min(len - 1)
    }
}

impl From<isize> for ByteRange {
    fn from(i: isize) -> Self {
        Self::Index(i)
    }
}

impl From<Range<usize>> for ByteRange {
    fn from(r: Range<usize>) -> Self {
        Self::slice(Some(offset(r.start)), Some(offset(r.end)))
    }
}

impl From<RangeFrom<usize>> for ByteRange {
    fn from(r: RangeFrom<usize>) -> Self {
        Self::slice(Some(offset(r.start)), None)
    }
}

impl From<RangeTo<usize>> for ByteRange {
    fn from(r: RangeTo<usize>) -> Self {
        Self::slice(None, Some(offset(r.end)))
    }
}

impl From<RangeFull> for ByteRange {
    fn from(_: RangeFull) -> Self {
        Self::slice(None, None)
    }
}

/// Randomly addressed, partially materialized view of the input.
///
/// One buffer serves one parse at a time; `&mut self` enforces that.
pub trait ParserBuffer {
    /// Bytes addressed by `range`, blocking until they are available.
    ///
    /// Returns fewer bytes than addressed only when the input has no more.
    fn get(&mut self, range: ByteRange) -> Result<Vec<u8>, ParseError>;

    /// True when nothing is buffered and the input is exhausted.
    fn at_eof(&self) -> bool;

    /// Irrevocably discard the first `n` logical bytes.
    fn drop_prefix(&mut self, n: usize) -> Result<(), ParseError>;

    /// The buffered window, for diagnostics.
    fn get_current(&self) -> &[u8];
}

impl<B: ParserBuffer + ?Sized> ParserBuffer for &mut B {
    fn get(&mut self, range: ByteRange) -> Result<Vec<u8>, ParseError> {
        (**self).get(range)
    }

    fn at_eof(&self) -> bool {
        (**self).at_eof()
    }

    fn drop_prefix(&mut self, n: usize) -> Result<(), ParseError> {
        (**self).drop_prefix(n)
    }

    fn get_current(&self) -> &[u8] {
        (**self).get_current()
    }
}

/// Buffer over a complete, known byte sequence.
#[derive(Debug, Clone)]
pub struct BytesBuffer<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> BytesBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Total length of the logical input still addressable.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - self.offset
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ParserBuffer for BytesBuffer<'_> {
    fn get(&mut self, range: ByteRange) -> Result<Vec<u8>, ParseError> {
        Ok(range.resolve(self.get_current()))
    }

    fn at_eof(&self) -> bool {
        self.is_empty()
    }

    fn drop_prefix(&mut self, n: usize) -> Result<(), ParseError> {
        if n > self.len() {
            let available = self.len();
            self.offset = self.data.len();
            return Err(short_read(n, available).into());
        }
        self.offset += n;
        Ok(())
    }

    fn get_current(&self) -> &[u8] {
        &self.data[self.offset..]
    }
}

/// Buffer over a sequential source, materializing only what ranges demand.
#[derive(Debug)]
pub struct StreamBuffer<S> {
    source: S,
    window: Vec<u8>,
}

impl<S: ByteSource> StreamBuffer<S> {
    pub fn new(source: S) -> Self {
        Self::with_capacity(source, 0)
    }

    /// Preallocate room for `capacity` buffered bytes.
    pub fn with_capacity(source: S, capacity: usize) -> Self {
        Self {
            source,
            window: Vec::with_capacity(capacity),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Pull whatever `required` bytes are not buffered yet.
    fn fill(&mut self, required: Option<usize>) -> Result<(), ParseError> {
        if self.source.at_eof() {
            return Ok(());
        }
        match required {
            None => {
                let rest = self.source.read_to_end()?;
                log_trace!("stream buffer pulled remaining {} bytes", rest.len());
                self.window.extend_from_slice(&rest);
            }
            Some(n) if n > self.window.len() => {
                let wanted = n - self.window.len();
                let chunk = self.source.read(wanted)?;
                log_trace!("stream buffer pulled {} of {} bytes", chunk.len(), wanted);
                self.window.extend_from_slice(&chunk);
            }
            Some(_) => {}
        }
        Ok(())
    }
}

impl<S: ByteSource> ParserBuffer for StreamBuffer<S> {
    fn get(&mut self, range: ByteRange) -> Result<Vec<u8>, ParseError> {
        self.fill(range.required_len())?;
        Ok(range.resolve(&self.window))
    }

    fn at_eof(&self) -> bool {
        self.window.is_empty() && self.source.at_eof()
    }

    fn drop_prefix(&mut self, n: usize) -> Result<(), ParseError> {
        if n <= self.window.len() {
            self.window.drain(..n);
            return Ok(());
        }
        let unbuffered = n - self.window.len();
        self.window.clear();
        log_trace!("stream buffer skipping {} unbuffered bytes", unbuffered);
        self.source.discard_exact(unbuffered)?;
        Ok(())
    }

    fn get_current(&self) -> &[u8] {
        &self.window
    }
}
