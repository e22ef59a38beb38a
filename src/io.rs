//! Byte-counting I/O wrappers.
//!
//! [`BarReader`] and [`BarWriter`] pass every call through to the wrapped
//! reader or writer and add the number of bytes actually transferred to a
//! [`Bar`]. Build the bar with the expected byte count as its total:
//!
//! ```
//! use std::io::{Cursor, Read};
//! use live_progress::{BarBuilder, io::BarReader};
//!
//! let data = vec![7u8; 64];
//! let bar = BarBuilder::new(data.len() as u64).build()?;
//! let mut reader = BarReader::new(Cursor::new(data), bar.clone());
//! reader.read_to_end(&mut Vec::new())?;
//! assert_eq!(bar.current(), 64);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The cost is one atomic addition per call.

use std::io::{self, BufRead, Read, Write};

use crate::bar::Bar;

/// A [`Read`] adapter that advances a bar by the bytes read.
#[derive(Debug)]
pub struct BarReader<R> {
    inner: R,
    bar: Bar,
}

impl<R> BarReader<R> {
    /// Wraps `inner`, reporting to `bar`.
    pub const fn new(inner: R, bar: Bar) -> Self {
        Self { inner, bar }
    }

    /// The bar being advanced.
    pub const fn bar(&self) -> &Bar {
        &self.bar
    }

    /// Unwraps the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for BarReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.bar.add(n as u64);
        Ok(n)
    }
}

impl<R: BufRead> BufRead for BarReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amount: usize) {
        self.inner.consume(amount);
        self.bar.add(amount as u64);
    }
}

/// A [`Write`] adapter that advances a bar by the bytes written.
#[derive(Debug)]
pub struct BarWriter<W> {
    inner: W,
    bar: Bar,
}

impl<W> BarWriter<W> {
    /// Wraps `inner`, reporting to `bar`.
    pub const fn new(inner: W, bar: Bar) -> Self {
        Self { inner, bar }
    }

    /// The bar being advanced.
    pub const fn bar(&self) -> &Bar {
        &self.bar
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for BarWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bar.add(n as u64);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead as _, BufReader, Cursor, Read as _, Write as _};

    use super::{BarReader, BarWriter};
    use crate::builder::BarBuilder;

    /// Reader Tracking
    /// Only bytes actually read are counted.
    #[test]
    fn test_reader_counts_bytes() {
        let data = vec![0u8; 100];
        let bar = BarBuilder::new(100).build().unwrap();
        let mut reader = BarReader::new(Cursor::new(&data), bar.clone());

        let mut buf = [0u8; 10];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(bar.current(), 10);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(bar.current(), 100);
        assert!((bar.ratio() - 1.0).abs() < f64::EPSILON);
    }

    /// Buffered Reads
    /// Consumed bytes are counted once.
    #[test]
    fn test_buffered_reader_counts_consumed() {
        let bar = BarBuilder::new(12).build().unwrap();
        let mut reader = BarReader::new(BufReader::new(Cursor::new(b"one\ntwo\nsix\n")), bar.clone());
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "one\n");
        assert_eq!(bar.current(), 4);
        let inner = reader.into_inner();
        assert_eq!(inner.buffer(), b"two\nsix\n");
    }

    /// Writer Tracking
    #[test]
    fn test_writer_counts_bytes() {
        let bar = BarBuilder::new(50).build().unwrap();
        let mut writer = BarWriter::new(Vec::new(), bar.clone());
        writer.write_all(&[1, 2, 3, 4, 5]).unwrap();
        writer.flush().unwrap();
        assert_eq!(bar.current(), 5);
        assert!(writer.bar().ptr_eq(&bar));
        assert_eq!(writer.into_inner(), [1, 2, 3, 4, 5]);
    }
}
