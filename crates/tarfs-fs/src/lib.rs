//! # tarfs-fs
//!
//! Read-only filesystem view over (optionally compressed) tar archives.
//!
//! This crate provides:
//! - [`ArchiveIndex`]: directory-tree semantics over an archive's flat
//!   member list, with position-derived inode numbers
//! - FUSE filesystem support (with the `fuse` feature)
//! - Mount-point resolution for the `tarfs-mount` binary (with `cli`)
//!
//! ## Example
//!
//! ```ignore
//! use tarfs_format::TarArchive;
//! use tarfs_fs::{ArchiveIndex, ROOT_INODE};
//!
//! let archive = TarArchive::open("data.tar.xz")?;
//! let index = ArchiveIndex::build(archive.scan_members()?);
//!
//! let inode = index.resolve_child(ROOT_INODE, "README.md")?;
//! println!("README.md is inode {}", inode);
//! ```
//!
//! ## FUSE Support
//!
//! Enable the `fuse` feature to mount archives (Unix only):
//!
//! ```ignore
//! use tarfs_format::TarArchive;
//! use tarfs_fs::fuse::{mount, TarFuseFS};
//!
//! let archive = TarArchive::open("data.tar.gz")?;
//! let fs = TarFuseFS::new(archive)?;
//! mount(fs, "/mnt/data", false)?;
//! ```

mod error;
mod index;
mod mountpoint;

#[cfg(feature = "fuse")]
pub mod fuse;

pub use error::{FsError, Result};
pub use index::{ArchiveIndex, ROOT_INODE};
pub use mountpoint::resolve_mount_point;

// Re-export tarfs-format types for convenience
pub use tarfs_format::{ArchiveMember, Compression, MemberKind, TarArchive};
