//! Sequential byte sources feeding a [`StreamBuffer`](crate::StreamBuffer).
//!
//! A source only ever moves forward. It learns that it is exhausted the way
//! a socket or pipe does: a read comes up short. Until then `at_eof()` stays
//! false even if the next read would return nothing.

use std::io::{self, Read};

/// Bytes pulled per step when a source skips data it must not buffer.
const DISCARD_CHUNK: usize = 8 * 1024;

/// The abstract boundary between the engine and whatever supplies bytes.
pub trait ByteSource {
    /// Read up to `max_n` bytes. Fewer are returned only at end of data.
    fn read(&mut self, max_n: usize) -> io::Result<Vec<u8>>;

    /// Read everything that remains.
    fn read_to_end(&mut self) -> io::Result<Vec<u8>>;

    /// True once the source has observed end of data.
    fn at_eof(&self) -> bool;

    /// Read exactly `n` bytes, failing with `UnexpectedEof` otherwise.
    fn read_exact(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let data = self.read(n)?;
        if data.len() < n {
            return Err(short_read(n, data.len()));
        }
        Ok(data)
    }

    /// Skip exactly `n` bytes without handing them to the caller.
    ///
    /// The default reads through [`read`](Self::read) in chunks of at most
    /// `DISCARD_CHUNK` bytes, each materialized and dropped. Sources that can
    /// skip without copying should override it.
    fn discard_exact(&mut self, n: usize) -> io::Result<()> {
        let mut remaining = n;
        while remaining > 0 {
            let step = remaining.min(DISCARD_CHUNK);
            let got = self.read(step)?.len();
            if got < step {
                return Err(short_read(n, n - remaining + got));
            }
            remaining -= step;
        }
        Ok(())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read(&mut self, max_n: usize) -> io::Result<Vec<u8>> {
        (**self).read(max_n)
    }

    fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        (**self).read_to_end()
    }

    fn at_eof(&self) -> bool {
        (**self).at_eof()
    }

    fn read_exact(&mut self, n: usize) -> io::Result<Vec<u8>> {
        (**self).read_exact(n)
    }

    fn discard_exact(&mut self, n: usize) -> io::Result<()> {
        (**self).discard_exact(n)
    }
}

pub(crate) fn short_read(wanted: usize, got: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("source ended after {got} of {wanted} bytes"),
    )
}

/// In-memory source with stream semantics.
#[derive(Debug, Clone)]
pub struct SliceSource {
    data: Vec<u8>,
    pos: usize,
    eof: bool,
}

impl SliceSource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            eof: false,
        }
    }

    /// Bytes handed out or skipped so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl ByteSource for SliceSource {
    fn read(&mut self, max_n: usize) -> io::Result<Vec<u8>> {
        if max_n > self.remaining() {
            self.eof = true;
        }
        let end = self.pos + max_n.min(self.remaining());
        let chunk = self.data[self.pos..end].to_vec();
        self.pos = end;
        Ok(chunk)
    }

    fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        self.eof = true;
        let chunk = self.data[self.pos..].to_vec();
        self.pos = self.data.len();
        Ok(chunk)
    }

    fn at_eof(&self) -> bool {
        self.eof
    }

    fn discard_exact(&mut self, n: usize) -> io::Result<()> {
        if n > self.remaining() {
            let got = self.remaining();
            self.pos = self.data.len();
            self.eof = true;
            return Err(short_read(n, got));
        }
        self.pos += n;
        Ok(())
    }
}

/// Adapter turning any [`Read`] (file, socket, stdin) into a [`ByteSource`].
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: R,
    eof: bool,
}

impl<R: Read> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, eof: false }
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn read(&mut self, max_n: usize) -> io::Result<Vec<u8>> {
        // `max_n` can be decoded from the input; grow with what arrives.
        let mut buf = Vec::new();
        let limit = u64::try_from(max_n).unwrap_or(u64::MAX);
        (&mut self.reader).take(limit).read_to_end(&mut buf)?;
        if buf.len() < max_n {
            self.eof = true;
        }
        Ok(buf)
    }

    fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        self.eof = true;
        Ok(buf)
    }

    fn at_eof(&self) -> bool {
        self.eof
    }

    fn discard_exact(&mut self, n: usize) -> io::Result<()> {
        let wanted = n as u64;
        let copied = io::copy(&mut (&mut self.reader).take(wanted), &mut io::sink())?;
        if copied < wanted {
            self.eof = true;
            return Err(short_read(n, copied as usize));
        }
        Ok(())
    }
}
