use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::member::{ArchiveMember, MemberKind};
use log::debug;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// An opened tar archive.
///
/// The backing file is never modified. Member enumeration and content
/// reads each open their own decoder stream, so nothing here holds a
/// shared cursor and concurrent callers need no locking.
#[derive(Debug)]
pub struct TarArchive {
    path: PathBuf,
    compression: Compression,
    byte_size: u64,
}

impl TarArchive {
    /// Open a tar archive, detecting the decompression mode from the
    /// filename suffix.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let compression = Compression::for_file_name(&name);
        let byte_size = fs::metadata(&path)?.len();

        debug!(
            "opened {} ({:?}, {} bytes on disk)",
            path.display(),
            compression,
            byte_size
        );

        Ok(Self {
            path,
            compression,
            byte_size,
        })
    }

    /// Path to the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decompression mode detected from the filename.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// On-disk size of the archive file in bytes, compressed or not.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Scan the archive and return its ordered member list.
    ///
    /// Directory members are stored in tar with a trailing slash; the
    /// returned paths have it stripped so path splitting is uniform.
    pub fn scan_members(&self) -> Result<Vec<ArchiveMember>> {
        let mut archive = tar::Archive::new(self.compression.open_stream(&self.path)?);
        let mut members = Vec::new();

        for entry in archive.entries()? {
            let entry = entry?;
            let header = entry.header();
            let path = String::from_utf8_lossy(&entry.path_bytes())
                .trim_end_matches('/')
                .to_string();

            members.push(ArchiveMember {
                path,
                kind: MemberKind::from(header.entry_type()),
                size: entry.size(),
                mode: header.mode()?,
                mtime: header.mtime()?,
            });
        }

        debug!("scanned {} members from {}", members.len(), self.path.display());
        Ok(members)
    }

    /// Read up to `size` bytes of the member at list position `index`,
    /// starting `offset` bytes into its content.
    ///
    /// Each call opens an independent decoder stream and walks to the
    /// indexed entry, so concurrent reads never interleave seeks. Returns
    /// an empty buffer at or past end-of-member; short reads happen only
    /// at end-of-member.
    pub fn read_member_at(&self, index: usize, offset: u64, size: usize) -> Result<Vec<u8>> {
        let mut archive = tar::Archive::new(self.compression.open_stream(&self.path)?);
        let mut entries = archive.entries()?;

        let mut entry = match entries.nth(index) {
            Some(entry) => entry?,
            None => return Err(Error::MemberNotFound(index)),
        };

        let total = entry.size();
        if offset >= total {
            return Ok(Vec::new());
        }

        // Decoder streams are not seekable; skip by draining.
        io::copy(&mut entry.by_ref().take(offset), &mut io::sink())?;

        let want = (size as u64).min(total - offset);
        let mut buf = Vec::with_capacity(want as usize);
        entry.take(want).read_to_end(&mut buf)?;
        Ok(buf)
    }
}
