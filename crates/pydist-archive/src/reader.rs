//! Format-dispatching archive reader.

use std::io::Read;

use bytes::{Bytes, BytesMut};

use crate::entry::FileEntry;
use crate::error::ArchiveResult;
use crate::format::ArchiveFormat;
use crate::source::ByteSource;
use crate::tar::TarGzReader;
use crate::zip::ZipReader;

/// Chunk size used by [`ArchiveReader::read_all`].
const READ_ALL_CHUNK_SIZE: usize = 64 * 1024;

/// A validated, resident archive with uniform member access.
///
/// Opening parses enough of the archive to prove it decodes: the zip central
/// directory for [`ArchiveFormat::Zip`], a full entry walk for
/// [`ArchiveFormat::TarGz`]. Every operation afterwards works from a fresh
/// cursor over the backing [`ByteSource`], so calls are independent and the
/// reader is safe to share behind an [`std::sync::Arc`].
#[derive(Debug)]
pub enum ArchiveReader {
    /// Zip-family archive (wheels, eggs, plain zips).
    Zip(ZipReader),
    /// Gzip-compressed tarball.
    TarGz(TarGzReader),
}

impl ArchiveReader {
    /// Opens and validates an archive of the given format.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Decode`](crate::ArchiveError::Decode) when the
    /// bytes do not parse as `format`, or
    /// [`ArchiveError::Io`](crate::ArchiveError::Io) when the source fails.
    pub fn open(format: ArchiveFormat, source: ByteSource) -> ArchiveResult<Self> {
        match format {
            ArchiveFormat::Zip => ZipReader::open(source).map(Self::Zip),
            ArchiveFormat::TarGz => TarGzReader::open(source).map(Self::TarGz),
        }
    }

    /// The format this reader decodes.
    pub const fn format(&self) -> ArchiveFormat {
        match self {
            Self::Zip(_) => ArchiveFormat::Zip,
            Self::TarGz(_) => ArchiveFormat::TarGz,
        }
    }

    /// The byte source backing this reader.
    pub fn source(&self) -> &ByteSource {
        match self {
            Self::Zip(reader) => reader.source(),
            Self::TarGz(reader) => reader.source(),
        }
    }

    /// Lists every file member of the archive. Directory members are omitted.
    ///
    /// # Errors
    ///
    /// Fails if the archive can no longer be decoded or its source read.
    pub fn list_files(&self) -> ArchiveResult<Vec<FileEntry>> {
        match self {
            Self::Zip(reader) => reader.list_files(),
            Self::TarGz(reader) => reader.list_files(),
        }
    }

    /// Uncompressed size of the named file member.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::NotFound`](crate::ArchiveError::NotFound) when
    /// no file member has that exact name. Directory members do not count.
    pub fn file_size(&self, path: &str) -> ArchiveResult<u64> {
        match self {
            Self::Zip(reader) => reader.file_size(path),
            Self::TarGz(reader) => reader.file_size(path),
        }
    }

    /// Reads the named file member fully into memory.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ArchiveReader::read_chunks`].
    pub fn read_all(&self, path: &str) -> ArchiveResult<Bytes> {
        let mut contents = BytesMut::new();
        self.read_chunks(path, READ_ALL_CHUNK_SIZE, |chunk| {
            contents.extend_from_slice(&chunk);
            Ok(())
        })?;
        Ok(contents.freeze())
    }

    /// Decompresses the named file member and feeds it to `sink` in chunks.
    ///
    /// Every chunk except the last is exactly `chunk_size` bytes; the last
    /// carries the remainder and an empty file produces no chunks at all.
    /// Missing members are reported before `sink` ever runs.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::NotFound`](crate::ArchiveError::NotFound) for
    /// absent members, [`ArchiveError::Decode`](crate::ArchiveError::Decode)
    /// when decompression fails mid-stream, or the first error `sink` returns.
    pub fn read_chunks(
        &self,
        path: &str,
        chunk_size: usize,
        sink: impl FnMut(Bytes) -> ArchiveResult<()>,
    ) -> ArchiveResult<()> {
        match self {
            Self::Zip(reader) => reader.read_chunks(path, chunk_size, sink),
            Self::TarGz(reader) => reader.read_chunks(path, chunk_size, sink),
        }
    }
}

/// Drains `reader` into `sink` in chunks of exactly `chunk_size` bytes, with
/// only the final chunk allowed to come up short.
pub(crate) fn read_in_chunks<R: Read + ?Sized>(
    reader: &mut R,
    chunk_size: usize,
    sink: &mut impl FnMut(Bytes) -> ArchiveResult<()>,
) -> ArchiveResult<()> {
    let chunk_size = chunk_size.max(1);
    let mut buf = vec![0u8; chunk_size];
    loop {
        // Decompressors return short reads freely, so keep filling until the
        // chunk is complete or the member ends.
        let mut filled = 0;
        while filled < buf.len() {
            let n = reader.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            return Ok(());
        }
        sink(Bytes::copy_from_slice(&buf[..filled]))?;
        if filled < buf.len() {
            return Ok(());
        }
    }
}
