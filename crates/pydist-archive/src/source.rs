//! Seekable byte sources with memory-to-disk spooling.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom, Write};

use bytes::{Bytes, BytesMut};
use tempfile::NamedTempFile;

/// Spool threshold above which a downloading archive spills from memory to
/// a temporary file: 4 MiB.
pub const DEFAULT_SPOOL_THRESHOLD: usize = 4 * 1024 * 1024;

/// A finite, seekable byte source backing an archive.
///
/// Small payloads stay in memory; larger ones live in a temporary file that
/// is deleted when the source drops. [`ByteSource::reader`] hands out an
/// independent cursor positioned at the start on every call, so operations
/// never share a file position: zip readers can seek freely and tar readers
/// can restart their sequential scan simply by asking for a new cursor.
#[derive(Debug)]
pub struct ByteSource {
    backing: Backing,
    len: u64,
}

#[derive(Debug)]
enum Backing {
    Memory(Bytes),
    Spooled(NamedTempFile),
}

impl ByteSource {
    /// Creates an in-memory byte source.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        Self {
            backing: Backing::Memory(bytes),
            len,
        }
    }

    /// Total length of the source in bytes.
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the source holds no bytes.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the source is spooled to a temporary file.
    pub const fn is_spooled(&self) -> bool {
        matches!(self.backing, Backing::Spooled(_))
    }

    /// Opens a fresh reader over the full source, positioned at the start.
    ///
    /// # Errors
    ///
    /// Fails if a spooled temporary file can no longer be reopened.
    pub fn reader(&self) -> io::Result<SourceReader> {
        match &self.backing {
            Backing::Memory(bytes) => Ok(SourceReader::Memory(Cursor::new(bytes.clone()))),
            Backing::Spooled(file) => Ok(SourceReader::Spooled(BufReader::new(file.reopen()?))),
        }
    }
}

/// An independent read cursor over a [`ByteSource`].
#[derive(Debug)]
pub enum SourceReader {
    /// Cursor over the in-memory bytes.
    Memory(Cursor<Bytes>),
    /// Buffered handle over the spooled temporary file.
    Spooled(BufReader<File>),
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Memory(cursor) => cursor.read(buf),
            Self::Spooled(file) => file.read(buf),
        }
    }
}

impl Seek for SourceReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::Memory(cursor) => cursor.seek(pos),
            Self::Spooled(file) => file.seek(pos),
        }
    }
}

/// Incremental writer that materializes a [`ByteSource`].
///
/// Bytes accumulate in memory until the running total crosses the spool
/// threshold, at which point everything written so far moves to a temporary
/// file and later chunks follow it there. Abandoning the writer (or the
/// finished source) removes the file.
#[derive(Debug)]
pub struct SpooledWriter {
    threshold: usize,
    state: WriterState,
    written: u64,
}

#[derive(Debug)]
enum WriterState {
    Memory(BytesMut),
    Spooled(NamedTempFile),
}

impl SpooledWriter {
    /// Creates a writer that spills to disk past `threshold` bytes.
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            state: WriterState::Memory(BytesMut::new()),
            written: 0,
        }
    }

    /// Total bytes accepted so far.
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Appends a chunk, spilling to a temporary file when the running total
    /// crosses the threshold.
    ///
    /// # Errors
    ///
    /// Fails if the temporary file cannot be created or written.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        if let WriterState::Memory(buf) = &mut self.state {
            if buf.len() + chunk.len() > self.threshold {
                let mut file = NamedTempFile::new()?;
                file.write_all(buf)?;
                self.state = WriterState::Spooled(file);
            }
        }

        match &mut self.state {
            WriterState::Memory(buf) => buf.extend_from_slice(chunk),
            WriterState::Spooled(file) => file.write_all(chunk)?,
        }
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Finalizes the writer into a read-only [`ByteSource`].
    ///
    /// # Errors
    ///
    /// Fails if a spooled temporary file cannot be flushed.
    pub fn finish(self) -> io::Result<ByteSource> {
        let backing = match self.state {
            WriterState::Memory(buf) => Backing::Memory(buf.freeze()),
            WriterState::Spooled(mut file) => {
                file.flush()?;
                Backing::Spooled(file)
            }
        };
        Ok(ByteSource {
            backing,
            len: self.written,
        })
    }
}

impl Default for SpooledWriter {
    fn default() -> Self {
        Self::new(DEFAULT_SPOOL_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(source: &ByteSource) -> Vec<u8> {
        let mut contents = Vec::new();
        source.reader().unwrap().read_to_end(&mut contents).unwrap();
        contents
    }

    #[test]
    fn test_memory_source_round_trips() {
        let source = ByteSource::from_bytes(&b"hello world"[..]);
        assert_eq!(source.len(), 11);
        assert!(!source.is_empty());
        assert!(!source.is_spooled());
        assert_eq!(read_all(&source), b"hello world");
    }

    #[test]
    fn test_each_reader_starts_at_the_beginning() {
        let source = ByteSource::from_bytes(&b"abcdef"[..]);
        let mut first = source.reader().unwrap();
        let mut buf = [0u8; 3];
        first.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"abc");

        // A second cursor is unaffected by the first one's position.
        assert_eq!(read_all(&source), b"abcdef");
        first.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"def");
    }

    #[test]
    fn test_writer_stays_in_memory_below_threshold() {
        let mut writer = SpooledWriter::new(16);
        writer.write_chunk(b"0123456789abcdef").unwrap();
        assert_eq!(writer.written(), 16);

        let source = writer.finish().unwrap();
        assert!(!source.is_spooled());
        assert_eq!(read_all(&source), b"0123456789abcdef");
    }

    #[test]
    fn test_writer_spills_past_threshold() {
        let mut writer = SpooledWriter::new(8);
        writer.write_chunk(b"0123").unwrap();
        writer.write_chunk(b"4567").unwrap();
        writer.write_chunk(b"89").unwrap();
        assert_eq!(writer.written(), 10);

        let source = writer.finish().unwrap();
        assert!(source.is_spooled());
        assert_eq!(source.len(), 10);
        assert_eq!(read_all(&source), b"0123456789");
    }

    #[test]
    fn test_spooled_source_supports_seeking() {
        let mut writer = SpooledWriter::new(0);
        writer.write_chunk(b"0123456789").unwrap();
        let source = writer.finish().unwrap();
        assert!(source.is_spooled());

        let mut reader = source.reader().unwrap();
        reader.seek(SeekFrom::Start(6)).unwrap();
        let mut tail = Vec::new();
        reader.read_to_end(&mut tail).unwrap();
        assert_eq!(tail, b"6789");
    }

    #[test]
    fn test_empty_source() {
        let source = SpooledWriter::new(4).finish().unwrap();
        assert!(source.is_empty());
        assert_eq!(source.len(), 0);
        assert_eq!(read_all(&source), b"");
    }
}
