//! Fixed-size chunking in front of a caller's sink.

use std::io::{self, Write};

/// Bytes handed to the caller's sink per write.
pub const CHUNK_SIZE: usize = 4096;

/// Buffers incoming bytes and forwards them in `CHUNK_SIZE` writes. The
/// final short chunk is written by [`ChunkedWriter::finish`].
pub(crate) struct ChunkedWriter<'a> {
    inner: &'a mut dyn Write,
    buf: Vec<u8>,
    written: u64,
}

impl<'a> ChunkedWriter<'a> {
    pub(crate) fn new(inner: &'a mut dyn Write) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(CHUNK_SIZE),
            written: 0,
        }
    }

    /// Bytes accepted so far (buffered or forwarded).
    pub(crate) fn written(&self) -> u64 {
        self.written
    }

    /// Write out the remaining partial chunk and flush the sink.
    pub(crate) fn finish(mut self) -> io::Result<u64> {
        if !self.buf.is_empty() {
            self.inner.write_all(&self.buf)?;
            self.buf.clear();
        }
        self.inner.flush()?;
        Ok(self.written)
    }
}

impl Write for ChunkedWriter<'_> {
    fn write(&mut self, mut data: &[u8]) -> io::Result<usize> {
        let len = data.len();
        while !data.is_empty() {
            let take = (CHUNK_SIZE - self.buf.len()).min(data.len());
            self.buf.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.buf.len() == CHUNK_SIZE {
                self.inner.write_all(&self.buf)?;
                self.buf.clear();
            }
        }
        self.written += len as u64;
        Ok(len)
    }

    /// Chunk boundaries are kept; buffered bytes wait for `finish`.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the size of every write it receives.
    #[derive(Default)]
    struct SizeLog {
        sizes: Vec<usize>,
        data: Vec<u8>,
    }

    impl Write for SizeLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.sizes.push(buf.len());
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn forwards_fixed_size_chunks() {
        let body: Vec<u8> = (0u8..=255).cycle().take(CHUNK_SIZE * 2 + 100).collect();
        let mut log = SizeLog::default();
        {
            let mut w = ChunkedWriter::new(&mut log);
            // Uneven pieces, as a transport would deliver them.
            for piece in body.chunks(1000) {
                w.write_all(piece).unwrap();
            }
            assert_eq!(w.written(), body.len() as u64);
            assert_eq!(w.finish().unwrap(), body.len() as u64);
        }
        assert_eq!(log.sizes, vec![CHUNK_SIZE, CHUNK_SIZE, 100]);
        assert_eq!(log.data, body);
    }

    #[test]
    fn empty_body_writes_nothing() {
        let mut log = SizeLog::default();
        let w = ChunkedWriter::new(&mut log);
        assert_eq!(w.finish().unwrap(), 0);
        assert!(log.sizes.is_empty());
    }
}
