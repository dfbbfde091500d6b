//! Explicit output capture for template evaluation.

use crate::error::RenderError;
use std::io::{self, Write};

/// In-memory sink a template evaluates into.
///
/// The captured bytes only leave the buffer through [`OutputBuffer::finish`].
/// A buffer dropped without finishing discards whatever was written, which
/// is how partial output from a failed evaluation is thrown away.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
    finished: bool,
}

impl OutputBuffer {
    pub fn start() -> Self {
        Self::default()
    }

    /// Number of bytes captured so far.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Stop capturing and return the output as a string.
    pub fn finish(mut self) -> Result<String, RenderError> {
        self.finished = true;
        let bytes = std::mem::take(&mut self.bytes);
        Ok(String::from_utf8(bytes)?)
    }

    /// Stop capturing and throw the output away. Returns the discarded size.
    pub fn discard(mut self) -> usize {
        self.finished = true;
        let discarded = self.bytes.len();
        self.bytes.clear();
        discarded
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for OutputBuffer {
    fn drop(&mut self) {
        if !self.finished && !self.bytes.is_empty() {
            tracing::debug!(bytes = self.bytes.len(), "discarding unfinished output buffer");
        }
    }
}
