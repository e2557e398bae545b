//! Archive entry metadata.

use serde::{Deserialize, Serialize};

/// One non-directory entry inside an archive.
///
/// Entries are produced fresh for every listing call and are not retained
/// beyond the response they were built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileEntry {
    /// Archive-internal path, `/`-separated and case-sensitive.
    pub name: String,
    /// Uncompressed length in bytes.
    pub size: u64,
}

impl FileEntry {
    /// Creates an entry from its path and uncompressed size.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_name_and_size() {
        let entry = FileEntry::new("pkg/__init__.py", 42);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["name"], "pkg/__init__.py");
        assert_eq!(json["size"], 42);
    }
}
