use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use xz2::read::XzDecoder;

/// Decompression mode of a backing archive, determined by filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Stored uncompressed.
    Plain,
    /// gzip-compressed stream.
    Gzip,
    /// bzip2-compressed stream.
    Bzip2,
    /// xz-compressed stream.
    Xz,
}

impl Compression {
    /// Determine the decompression mode from an archive file name.
    ///
    /// The check is a case-insensitive suffix match, so `.tar.gz` and
    /// `.tgz` both map to [`Compression::Gzip`]. Unknown suffixes mean the
    /// archive is stored uncompressed.
    pub fn for_file_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with("gz") {
            Compression::Gzip
        } else if lower.ends_with("bz2") {
            Compression::Bzip2
        } else if lower.ends_with("xz") {
            Compression::Xz
        } else {
            Compression::Plain
        }
    }

    /// Open an independent decoder stream over the archive file.
    ///
    /// Every call returns a fresh reader positioned at the start of the
    /// decoded tar stream; callers never share a cursor.
    pub fn open_stream(self, path: &Path) -> io::Result<Box<dyn Read>> {
        let file = BufReader::new(File::open(path)?);
        Ok(match self {
            Compression::Plain => Box::new(file),
            Compression::Gzip => Box::new(GzDecoder::new(file)),
            Compression::Bzip2 => Box::new(BzDecoder::new(file)),
            Compression::Xz => Box::new(XzDecoder::new(file)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_for_common_suffixes() {
        assert_eq!(Compression::for_file_name("x.tar"), Compression::Plain);
        assert_eq!(Compression::for_file_name("x.tar.gz"), Compression::Gzip);
        assert_eq!(Compression::for_file_name("x.tar.bz2"), Compression::Bzip2);
        assert_eq!(Compression::for_file_name("x.tar.xz"), Compression::Xz);
    }

    #[test]
    fn mode_for_short_suffixes() {
        assert_eq!(Compression::for_file_name("x.tgz"), Compression::Gzip);
        assert_eq!(Compression::for_file_name("x.tbz2"), Compression::Bzip2);
        assert_eq!(Compression::for_file_name("x.txz"), Compression::Xz);
    }

    #[test]
    fn mode_is_case_insensitive() {
        assert_eq!(Compression::for_file_name("X.TAR.GZ"), Compression::Gzip);
        assert_eq!(Compression::for_file_name("x.Tar.Bz2"), Compression::Bzip2);
        assert_eq!(Compression::for_file_name("ARCHIVE.TXZ"), Compression::Xz);
    }

    #[test]
    fn unknown_suffix_means_plain() {
        assert_eq!(Compression::for_file_name("x.bin"), Compression::Plain);
        assert_eq!(Compression::for_file_name("archive"), Compression::Plain);
    }
}
