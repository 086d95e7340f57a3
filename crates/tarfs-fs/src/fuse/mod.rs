//! FUSE adapter for tar archives.
//!
//! This module mounts a (optionally compressed) tar archive as a
//! read-only filesystem. The archive is never extracted to disk: the
//! member list is indexed once at mount time and file content is decoded
//! on demand, one independent stream per read call.
//!
//! # Example
//!
//! ```ignore
//! use tarfs_format::TarArchive;
//! use tarfs_fs::fuse::{mount, TarFuseFS};
//!
//! let archive = TarArchive::open("data.tar.gz")?;
//! let fs = TarFuseFS::new(archive)?;
//! mount(fs, "/mnt/data", false)?;
//! ```

mod adapter;

pub use adapter::*;
