//! Gzip-compressed tarball access.

use std::io::{self, Read};

use flate2::read::GzDecoder;
use tar::{Archive, Entry};

use crate::entry::FileEntry;
use crate::error::{ArchiveError, ArchiveResult};
use crate::format::ArchiveFormat;
use crate::reader::read_in_chunks;
use crate::source::{ByteSource, SourceReader};

/// Reader over a gzip-compressed tarball backed by a [`ByteSource`].
///
/// Tar has no index, so every operation decompresses from the start and
/// scans entries sequentially. Opening performs one full walk to validate
/// that the whole stream decodes. A tarball may carry the same path more
/// than once; member lookups resolve the last occurrence, which is the
/// version sequential extraction leaves behind.
#[derive(Debug)]
pub struct TarGzReader {
    source: ByteSource,
}

impl TarGzReader {
    /// Opens the source as a gzip-compressed tarball, walking every entry
    /// to validate the stream end to end.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Decode`] when the bytes are not a gzipped
    /// tarball, or [`ArchiveError::Io`] when the source fails.
    pub fn open(source: ByteSource) -> ArchiveResult<Self> {
        let reader = Self { source };
        let mut archive = reader.archive()?;
        for entry in archive.entries().map_err(map_tar_err)? {
            let entry = entry.map_err(map_tar_err)?;
            entry_name(&entry)?;
        }
        Ok(reader)
    }

    /// The byte source backing this reader.
    pub const fn source(&self) -> &ByteSource {
        &self.source
    }

    /// Lists the file members of the tarball, skipping directories.
    pub fn list_files(&self) -> ArchiveResult<Vec<FileEntry>> {
        let mut archive = self.archive()?;
        let mut entries = Vec::new();
        for entry in archive.entries().map_err(map_tar_err)? {
            let entry = entry.map_err(map_tar_err)?;
            if entry.header().entry_type().is_dir() {
                continue;
            }
            entries.push(FileEntry::new(entry_name(&entry)?, entry.size()));
        }
        Ok(entries)
    }

    /// Uncompressed size of the named file member.
    pub fn file_size(&self, path: &str) -> ArchiveResult<u64> {
        let member = self.find_last(path)?.ok_or_else(|| ArchiveError::not_found(path))?;
        if member.is_dir {
            return Err(ArchiveError::not_found(path));
        }
        Ok(member.size)
    }

    /// Decompresses the named file member into `sink`, chunk by chunk.
    pub fn read_chunks(
        &self,
        path: &str,
        chunk_size: usize,
        mut sink: impl FnMut(bytes::Bytes) -> ArchiveResult<()>,
    ) -> ArchiveResult<()> {
        let member = self.find_last(path)?.ok_or_else(|| ArchiveError::not_found(path))?;
        if member.is_dir {
            return Err(ArchiveError::not_found(path));
        }
        // A fresh scan forward to the located entry; tar cannot seek back.
        let mut archive = self.archive()?;
        for (index, entry) in archive.entries().map_err(map_tar_err)?.enumerate() {
            let mut entry = entry.map_err(map_tar_err)?;
            if index == member.index {
                return read_in_chunks(&mut entry, chunk_size, &mut sink);
            }
        }
        Err(ArchiveError::not_found(path))
    }

    /// Scans the whole tarball for the last entry named `path`.
    fn find_last(&self, path: &str) -> ArchiveResult<Option<LocatedMember>> {
        let mut archive = self.archive()?;
        let mut found = None;
        for (index, entry) in archive.entries().map_err(map_tar_err)?.enumerate() {
            let entry = entry.map_err(map_tar_err)?;
            if entry_name(&entry)? == path {
                found = Some(LocatedMember {
                    index,
                    size: entry.size(),
                    is_dir: entry.header().entry_type().is_dir(),
                });
            }
        }
        Ok(found)
    }

    fn archive(&self) -> ArchiveResult<Archive<GzDecoder<SourceReader>>> {
        Ok(Archive::new(GzDecoder::new(self.source.reader()?)))
    }
}

/// Position and metadata of a matched tarball entry.
struct LocatedMember {
    index: usize,
    size: u64,
    is_dir: bool,
}

fn entry_name<R: Read>(entry: &Entry<'_, R>) -> ArchiveResult<String> {
    Ok(entry.path().map_err(map_tar_err)?.to_string_lossy().into_owned())
}

fn map_tar_err(err: io::Error) -> ArchiveError {
    // The tar and gzip decoders surface corruption as InvalidData or
    // UnexpectedEof on the reader they wrap.
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof | io::ErrorKind::Other => {
            ArchiveError::decode(ArchiveFormat::TarGz, err.to_string())
        }
        _ => ArchiveError::Io(err),
    }
}
