//! Container formats and URL suffix sniffing.

use serde::{Deserialize, Serialize};

/// Container format of a distribution archive.
///
/// The format is sniffed once from the download URL suffix, before any
/// bytes are fetched, and stored alongside the archive for the rest of its
/// resident lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveFormat {
    /// Zip-family container: wheels (`.whl`), eggs (`.egg`), plain `.zip`.
    Zip,
    /// Gzip-compressed tarball (`.tar.gz` source distributions).
    TarGz,
}

/// Suffixes naming the zip container.
const ZIP_SUFFIXES: [&str; 3] = [".whl", ".egg", ".zip"];

/// Suffix naming the gzip-tar container.
const TAR_GZ_SUFFIX: &str = ".tar.gz";

impl ArchiveFormat {
    /// Sniffs the archive format from a download URL or file name.
    ///
    /// Matching is case-sensitive and purely suffix-based; no bytes are
    /// inspected. Unrecognized suffixes such as `.tar` or `.tar.bz2` yield
    /// `None`.
    pub fn from_url(url: &str) -> Option<Self> {
        if url.ends_with(TAR_GZ_SUFFIX) {
            Some(Self::TarGz)
        } else if ZIP_SUFFIXES.iter().any(|suffix| url.ends_with(suffix)) {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_suffixes_map_to_zip() {
        for url in [
            "https://host/packages/demo-0.1.0-py3-none-any.whl",
            "https://host/packages/demo-0.1.0-py2.7.egg",
            "https://host/packages/demo-0.1.0.zip",
        ] {
            assert_eq!(ArchiveFormat::from_url(url), Some(ArchiveFormat::Zip));
        }
    }

    #[test]
    fn test_tar_gz_suffix_maps_to_tar_gz() {
        assert_eq!(
            ArchiveFormat::from_url("https://host/packages/demo-0.1.0.tar.gz"),
            Some(ArchiveFormat::TarGz),
        );
    }

    #[test]
    fn test_unrecognized_suffixes_are_rejected() {
        for url in [
            "https://host/packages/demo-0.1.0.tar",
            "https://host/packages/demo-0.1.0.tar.bz2",
            "https://host/packages/demo-0.1.0.rar",
            "https://host/packages/demo",
            "",
        ] {
            assert_eq!(ArchiveFormat::from_url(url), None);
        }
    }

    #[test]
    fn test_sniffing_is_case_sensitive() {
        assert_eq!(ArchiveFormat::from_url("demo-0.1.0.WHL"), None);
        assert_eq!(ArchiveFormat::from_url("demo-0.1.0.TAR.GZ"), None);
    }

    #[test]
    fn test_display_names_are_stable() {
        assert_eq!(ArchiveFormat::Zip.to_string(), "zip");
        assert_eq!(ArchiveFormat::TarGz.to_string(), "tar-gz");
    }
}
