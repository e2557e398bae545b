#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod entry;
mod error;
mod format;
mod reader;
mod source;
mod tar;
mod zip;

pub use crate::entry::FileEntry;
pub use crate::error::{ArchiveError, ArchiveResult};
pub use crate::format::ArchiveFormat;
pub use crate::reader::ArchiveReader;
pub use crate::source::{ByteSource, DEFAULT_SPOOL_THRESHOLD, SourceReader, SpooledWriter};
pub use crate::tar::TarGzReader;
pub use crate::zip::ZipReader;
