//! stream/io.rs
//! `std::io` adapters: push-based writers and a sequential copy loop.
//!
//! Backpressure comes from the wrapped writer: `write` does not return until
//! the produced bytes have been handed to it.

use std::io::{self, Read, Write};

use bytes::Bytes;
use tracing::trace;

use crate::crypto::{AeadStream, Cipher, CryptoError, Decipher, Direction};
use crate::telemetry::TelemetryCounters;
use crate::types::StreamError;

fn to_io(e: CryptoError) -> io::Error {
    io::Error::from(StreamError::Crypto(e))
}

/// Encrypts everything written to it into `inner`.
pub struct EncryptWriter<W: Write> {
    inner: W,
    cipher: Cipher,
    counters: TelemetryCounters,
}

impl<W: Write> EncryptWriter<W> {
    /// `cipher` should already have its AAD bound, if any.
    pub fn new(inner: W, cipher: Cipher) -> Self {
        Self {
            inner,
            cipher,
            counters: TelemetryCounters::default(),
        }
    }

    pub fn counters(&self) -> &TelemetryCounters {
        &self.counters
    }

    /// Flush the final block and return the inner writer with the tag.
    pub fn finish(mut self) -> Result<(W, Vec<u8>), StreamError> {
        let last = self.cipher.finalize()?;
        self.inner.write_all(&last)?;
        self.inner.flush()?;
        let tag = self.cipher.auth_tag()?.to_vec();
        self.counters.add_final(last.len(), tag.len());
        Ok((self.inner, tag))
    }
}

impl<W: Write> Write for EncryptWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let out = self.cipher.update(buf).map_err(to_io)?;
        self.inner.write_all(&out)?;
        self.counters.add_chunk(buf.len(), out.len());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Decrypts everything written to it into `inner`.
///
/// Plaintext reaches `inner` before the tag is checked; it must be treated as
/// untrusted until `finish` returns `Ok`.
pub struct DecryptWriter<W: Write> {
    inner: W,
    decipher: Decipher,
    counters: TelemetryCounters,
}

impl<W: Write> DecryptWriter<W> {
    /// `decipher` must already hold the expected tag.
    pub fn new(inner: W, decipher: Decipher) -> Self {
        Self {
            inner,
            decipher,
            counters: TelemetryCounters::default(),
        }
    }

    pub fn counters(&self) -> &TelemetryCounters {
        &self.counters
    }

    /// Verify the tag and write the last plaintext block.
    pub fn finish(mut self) -> Result<W, StreamError> {
        let last = self.decipher.finalize()?;
        self.inner.write_all(&last)?;
        self.inner.flush()?;
        self.counters.add_final(last.len(), 0);
        Ok(self.inner)
    }
}

impl<W: Write> Write for DecryptWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let out = self.decipher.update(buf).map_err(to_io)?;
        self.inner.write_all(&out)?;
        self.counters.add_chunk(buf.len(), out.len());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Read up to `len` bytes, stopping early only at EOF.
pub fn read_exact_or_eof<R: Read + ?Sized>(r: &mut R, len: usize) -> io::Result<Bytes> {
    let mut buf = vec![0u8; len];
    let mut off = 0;

    while off < len {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    buf.truncate(off);
    Ok(Bytes::from(buf))
}

/// Sequentially pump `reader` through `stream` into `writer`, then finalize.
/// On encrypt the tag length is counted in `bytes_tag`.
pub fn copy_through<R, W, S>(
    reader: &mut R,
    writer: &mut W,
    stream: &mut S,
    chunk_size: usize,
) -> Result<TelemetryCounters, StreamError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    S: AeadStream + ?Sized,
{
    let mut counters = TelemetryCounters::default();
    loop {
        let chunk = read_exact_or_eof(reader, chunk_size)?;
        if chunk.is_empty() {
            break;
        }
        let out = stream.update(&chunk)?;
        writer.write_all(&out)?;
        counters.add_chunk(chunk.len(), out.len());
        trace!(in_len = chunk.len(), out_len = out.len(), "copied chunk");
    }

    let last = stream.finalize()?;
    writer.write_all(&last)?;
    writer.flush()?;
    let tag_len = match stream.direction() {
        Direction::Encrypt => stream.params().tag_len,
        Direction::Decrypt => 0,
    };
    counters.add_final(last.len(), tag_len);
    Ok(counters)
}
