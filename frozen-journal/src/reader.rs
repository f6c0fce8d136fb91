use std::io::Read;

use crate::error::{JournalError, Result};

/// Comfortably covers the worst-case event header: ten single-byte-capped varints,
/// an 8-byte stream id, and a 20-byte hash.
pub const DEFAULT_PEEK_CAPACITY: usize = 128;

/// A byte stream that tracks its absolute position and supports peeking ahead
/// without consuming.
///
/// Journal framing is position-relative: message lengths are encoded as an
/// offset from the start of the record to the end of the message, so every
/// decoder needs to know exactly how far it has advanced. Plain `BufRead`
/// doesn't guarantee that `fill_buf` returns more than what's left in its
/// internal buffer, which breaks peeking across a decompressor's own buffer
/// boundary, so `CountedReader` keeps a small ring of its own and refills it
/// directly from the underlying reader.
pub struct CountedReader<R> {
    inner: R,
    buf: Vec<u8>,
    start: usize,
    pos: u64,
}

impl<R: Read> CountedReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(DEFAULT_PEEK_CAPACITY),
            start: 0,
            pos: 0,
        }
    }

    /// Number of bytes consumed from the stream so far.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    fn available(&self) -> usize {
        self.buf.len() - self.start
    }

    fn fill_to(&mut self, n: usize) -> Result<()> {
        if self.start == self.buf.len() {
            self.buf.clear();
            self.start = 0;
        } else if self.start > DEFAULT_PEEK_CAPACITY {
            self.buf.drain(0..self.start);
            self.start = 0;
        }
        let mut chunk = [0u8; 4096];
        while self.available() < n {
            let read = self.inner.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            self.buf.extend_from_slice(&chunk[..read]);
        }
        Ok(())
    }

    /// Returns up to `n` bytes without advancing the stream. Returns fewer than `n`
    /// bytes only once the underlying stream is exhausted.
    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        self.fill_to(n)?;
        let end = self.buf.len().min(self.start + n);
        Ok(&self.buf[self.start..end])
    }

    /// Advances the stream by up to `n` bytes, returning how many were actually
    /// available to discard.
    pub fn discard(&mut self, n: usize) -> Result<usize> {
        self.fill_to(n)?;
        let take = self.available().min(n);
        self.start += take;
        self.pos += take as u64;
        Ok(take)
    }

    /// Reads exactly `n` bytes into `out`, replacing its previous contents. Reuses
    /// `out`'s allocation across calls instead of returning a fresh `Vec` each time.
    pub fn read_into(&mut self, n: usize, out: &mut Vec<u8>, context: &'static str) -> Result<()> {
        self.fill_to(n)?;
        if self.available() < n {
            return Err(JournalError::UnexpectedEof { context });
        }
        out.clear();
        out.extend_from_slice(&self.buf[self.start..self.start + n]);
        self.start += n;
        self.pos += n as u64;
        Ok(())
    }

    /// Reads exactly `n` bytes, or fails with [`JournalError::UnexpectedEof`].
    pub fn read_exact(&mut self, n: usize, context: &'static str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.read_into(n, &mut out, context)?;
        Ok(out)
    }

    /// Reads a single byte, or returns `None` at a clean end of stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let available = self.peek(1)?;
        if available.is_empty() {
            return Ok(None);
        }
        let byte = available[0];
        self.start += 1;
        self.pos += 1;
        Ok(Some(byte))
    }
}
