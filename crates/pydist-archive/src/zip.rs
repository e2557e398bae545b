//! Zip-family archive access (wheels, eggs, plain zips).

use zip::ZipArchive;
use zip::result::ZipError;

use crate::entry::FileEntry;
use crate::error::{ArchiveError, ArchiveResult};
use crate::format::ArchiveFormat;
use crate::reader::read_in_chunks;
use crate::source::{ByteSource, SourceReader};

/// Reader over a zip archive backed by a seekable [`ByteSource`].
///
/// The central directory is parsed once at open time to validate the
/// archive; member operations reopen it from a fresh cursor so they never
/// interfere with each other.
#[derive(Debug)]
pub struct ZipReader {
    source: ByteSource,
}

impl ZipReader {
    /// Opens the source as a zip archive, validating its central directory.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Decode`] when the bytes are not a zip
    /// archive, or [`ArchiveError::Io`] when the source fails.
    pub fn open(source: ByteSource) -> ArchiveResult<Self> {
        let reader = Self { source };
        reader.archive()?;
        Ok(reader)
    }

    /// The byte source backing this reader.
    pub const fn source(&self) -> &ByteSource {
        &self.source
    }

    /// Lists the file members of the archive, skipping directories.
    pub fn list_files(&self) -> ArchiveResult<Vec<FileEntry>> {
        let mut archive = self.archive()?;
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let member = archive.by_index(index).map_err(map_zip_err)?;
            if member.is_dir() {
                continue;
            }
            entries.push(FileEntry::new(member.name(), member.size()));
        }
        Ok(entries)
    }

    /// Uncompressed size of the named file member.
    pub fn file_size(&self, path: &str) -> ArchiveResult<u64> {
        let mut archive = self.archive()?;
        let member = archive.by_name(path).map_err(|err| map_lookup_err(err, path))?;
        if member.is_dir() {
            return Err(ArchiveError::not_found(path));
        }
        Ok(member.size())
    }

    /// Decompresses the named file member into `sink`, chunk by chunk.
    pub fn read_chunks(
        &self,
        path: &str,
        chunk_size: usize,
        mut sink: impl FnMut(bytes::Bytes) -> ArchiveResult<()>,
    ) -> ArchiveResult<()> {
        let mut archive = self.archive()?;
        let mut member = archive.by_name(path).map_err(|err| map_lookup_err(err, path))?;
        if member.is_dir() {
            return Err(ArchiveError::not_found(path));
        }
        read_in_chunks(&mut member, chunk_size, &mut sink)
    }

    fn archive(&self) -> ArchiveResult<ZipArchive<SourceReader>> {
        ZipArchive::new(self.source.reader()?).map_err(map_zip_err)
    }
}

fn map_zip_err(err: ZipError) -> ArchiveError {
    match err {
        ZipError::Io(err) => ArchiveError::Io(err),
        other => ArchiveError::decode(ArchiveFormat::Zip, other.to_string()),
    }
}

fn map_lookup_err(err: ZipError, path: &str) -> ArchiveError {
    match err {
        ZipError::FileNotFound => ArchiveError::not_found(path),
        other => map_zip_err(other),
    }
}
