//! Buffered stream copy shared by digesting, downloading and extraction.
//!
//! Every archive pass reads each entry once. One fixed-size buffer is
//! allocated per pass and reused for all of its entries.

use std::io::Read;
use std::io::Write;
use std::io::{self};

/// Size of a [`CopyBuffer`] (64KB).
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable heap buffer for copying entry streams.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Allocates a zeroed buffer of [`COPY_BUFFER_SIZE`] bytes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Reads one chunk, retrying on `Interrupted`. An empty slice means end
    /// of stream.
    fn fill<R: Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<&[u8]> {
        let n = loop {
            match reader.read(&mut self.buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                result => break result?,
            }
        };
        Ok(&self.buf[..n])
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Streams `reader` into `writer` until end of stream.
///
/// Returns the number of bytes copied.
///
/// # Errors
///
/// Returns the first read or write error; bytes already written stay
/// written.
///
/// # Examples
///
/// ```
/// use kawa_core::copy::CopyBuffer;
/// use kawa_core::copy::copy_with_buffer;
///
/// let mut buffer = CopyBuffer::new();
/// let mut lua = Vec::new();
/// let copied = copy_with_buffer(&mut &b"return {}"[..], &mut lua, &mut buffer).unwrap();
/// assert_eq!(copied, 9);
/// assert_eq!(lua, b"return {}");
/// ```
pub fn copy_with_buffer<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> io::Result<u64> {
    let mut copied = 0u64;
    loop {
        let chunk = buffer.fill(reader)?;
        if chunk.is_empty() {
            return Ok(copied);
        }
        writer.write_all(chunk)?;
        copied += chunk.len() as u64;
    }
}
