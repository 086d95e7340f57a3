//! # tarfs-format
//!
//! Tar archive decoding for tarfs mounts.
//!
//! This crate provides:
//! - Decompression-mode detection from the archive filename suffix
//!   (`gz`, `bz2`, `xz`, or stored uncompressed)
//! - Member-list scanning into [`ArchiveMember`] records
//! - Independent per-call content streams for member reads
//!
//! ## Example
//!
//! ```ignore
//! use tarfs_format::TarArchive;
//!
//! let archive = TarArchive::open("data.tar.gz")?;
//! let members = archive.scan_members()?;
//!
//! for (i, member) in members.iter().enumerate() {
//!     println!("{}: {} ({} bytes)", i, member.path, member.size);
//! }
//!
//! // Read the first 16 bytes of member 0.
//! let bytes = archive.read_member_at(0, 0, 16)?;
//! ```

mod archive;
mod compression;
mod error;
mod member;

pub use archive::TarArchive;
pub use compression::Compression;
pub use error::{Error, Result};
pub use member::{ArchiveMember, MemberKind};
