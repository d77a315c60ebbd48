//! Byte streams for archive entries (L1).
//!
//! `Source` and `Sink` are thin, allocation-free wrappers over `std::io`
//! that let the storage layer (L2) hand out decoders without committing to
//! a concrete reader type (inflating ZIP entry vs. a CFB sector chain vs. a
//! decrypted in-memory buffer all look the same from here on up).

use std::io::{self, Read, Write};

/// A readable byte stream. `read` returns the number of bytes actually
/// placed into `buf`; `0` means EOF, matching `std::io::Read`.
pub trait Source {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// A lower-bound hint of remaining bytes, not authoritative.
    fn available(&self) -> usize {
        0
    }
}

impl<R: Read> Source for R {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }
}

/// A writable byte sink.
pub trait Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

impl<W: Write> Sink for W {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(self, buf)
    }
}

/// Drain `src` into `sink` until EOF, returning the total bytes copied.
pub fn pipe(src: &mut dyn Source, sink: &mut dyn Sink) -> io::Result<u64> {
    let mut buf = [0u8; 8192];
    let mut total = 0u64;
    loop {
        let n = src.read(&mut buf)?;
        if n == 0 {
            return Ok(total);
        }
        sink.write(&buf[..n])?;
        total += n as u64;
    }
}

/// Read `src` fully into a `Vec<u8>`.
pub fn read_all(src: &mut dyn Source) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(src.available());
    let mut buf = [0u8; 8192];
    loop {
        let n = src.read(&mut buf)?;
        if n == 0 {
            return Ok(out);
        }
        out.extend_from_slice(&buf[..n]);
    }
}
