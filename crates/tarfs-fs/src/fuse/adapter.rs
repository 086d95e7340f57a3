//! FUSE adapter implementation for tar archives.
//!
//! This module implements the `fuser::Filesystem` trait for [`TarFuseFS`],
//! translating each filesystem operation into Archive Index queries and
//! on-demand member reads.

use crate::error::{FsError, Result};
use crate::index::{ArchiveIndex, ROOT_INODE};
use fuser::{
    FileAttr, FileType, Filesystem, MountOption, ReplyAttr, ReplyData, ReplyDirectory, ReplyEntry,
    ReplyOpen, Request,
};
use log::{debug, trace, warn};
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tarfs_format::{ArchiveMember, MemberKind, TarArchive};

/// Time-to-live for cached attributes and name entries.
///
/// The backing archive is immutable for the mount's lifetime, so the
/// kernel may cache for a long time.
const TTL: Duration = Duration::from_secs(3600);

/// Reported block size in attributes.
const BLOCK_SIZE: u32 = 512;

/// Fragment size for `statfs`; 1 makes the block count an exact byte count.
const STATFS_FRSIZE: u32 = 1;

/// Volume statistics reported by `statfs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeStats {
    /// Total blocks; with [`VolumeStats::frsize`] of 1 this is the
    /// archive's exact on-disk byte size.
    pub blocks: u64,
    /// Free blocks; always 0 on a read-only mount.
    pub bfree: u64,
    /// Blocks available to unprivileged users; always 0.
    pub bavail: u64,
    /// Total inodes: member count plus the synthetic root.
    pub files: u64,
    /// Free inodes; always 0.
    pub ffree: u64,
    /// Preferred I/O size.
    pub bsize: u32,
    /// Fragment size the block count is expressed in.
    pub frsize: u32,
    /// Maximum name length.
    pub namelen: u32,
}

/// FUSE filesystem adapter over a tar archive.
///
/// Owns the archive handle and the index built from its member list.
/// All state is immutable after construction, so operation dispatch
/// needs no locking; each read opens its own decoder stream.
pub struct TarFuseFS {
    archive: TarArchive,
    index: ArchiveIndex,
    /// User ID of the serving process; archives never dictate ownership.
    uid: u32,
    /// Group ID of the serving process.
    gid: u32,
}

impl TarFuseFS {
    /// Build the filesystem from an opened archive.
    ///
    /// Scans the full member list up front; a scan failure aborts the
    /// mount before any operation is served.
    pub fn new(archive: TarArchive) -> Result<Self> {
        let members = archive.scan_members()?;
        let index = ArchiveIndex::build(members);

        let uid = unsafe { libc::getuid() };
        let gid = unsafe { libc::getgid() };

        Ok(Self {
            archive,
            index,
            uid,
            gid,
        })
    }

    /// Number of archive members behind this filesystem.
    pub fn member_count(&self) -> usize {
        self.index.member_count()
    }

    /// Attributes of the synthetic root directory.
    fn root_attr(&self) -> FileAttr {
        let now = SystemTime::now();
        FileAttr {
            ino: ROOT_INODE,
            size: 0,
            blocks: 0,
            atime: now,
            mtime: now,
            ctime: now,
            crtime: now,
            kind: FileType::Directory,
            perm: 0o755,
            nlink: 2,
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: BLOCK_SIZE,
            flags: 0,
        }
    }

    /// Attributes derived from one archive member.
    fn member_attr(&self, inode: u64, member: &ArchiveMember) -> FileAttr {
        let kind = match member.kind {
            MemberKind::Directory => FileType::Directory,
            MemberKind::Regular => FileType::RegularFile,
            MemberKind::Symlink => FileType::Symlink,
            // Hard-link targets are not resolved to other inodes; the
            // member is presented as a symlink instead.
            MemberKind::Hardlink => FileType::Symlink,
            MemberKind::Fifo => FileType::NamedPipe,
            MemberKind::CharDevice => FileType::CharDevice,
            MemberKind::Unspecified => FileType::RegularFile,
        };
        let size = if member.kind == MemberKind::Regular {
            member.size
        } else {
            0
        };
        // The archive stores a single timestamp per member; it serves as
        // atime, ctime and mtime alike.
        let stamp = UNIX_EPOCH + Duration::from_secs(member.mtime);
        FileAttr {
            ino: inode,
            size,
            blocks: (size + u64::from(BLOCK_SIZE) - 1) / u64::from(BLOCK_SIZE),
            atime: stamp,
            mtime: stamp,
            ctime: stamp,
            crtime: stamp,
            kind,
            perm: (member.mode & 0o7777) as u16,
            nlink: 1,
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: BLOCK_SIZE,
            flags: 0,
        }
    }

    /// Attributes for any valid inode, root included.
    fn attr(&self, inode: u64) -> Result<FileAttr> {
        if inode == ROOT_INODE {
            return Ok(self.root_attr());
        }
        let member = self.index.member(inode)?;
        Ok(self.member_attr(inode, member))
    }

    /// Resolve `name` under `parent` and return the child's attributes.
    fn lookup_entry(&self, parent: u64, name: &str) -> Result<FileAttr> {
        let inode = self.index.resolve_child(parent, name)?;
        self.attr(inode)
    }

    /// Directory-open check; the handle is the inode itself.
    fn open_dir(&self, inode: u64) -> Result<u64> {
        if inode == ROOT_INODE {
            return Ok(inode);
        }
        if self.index.member(inode)?.kind == MemberKind::Directory {
            Ok(inode)
        } else {
            Err(FsError::NotFound)
        }
    }

    /// Children of `inode` past `offset`, each with attributes and the
    /// cursor to resume from.
    fn read_dir(&self, inode: u64, offset: u64) -> Result<Vec<(String, FileAttr, u64)>> {
        let mut entries = Vec::new();
        for (cursor, name, child) in self.index.children(inode)? {
            if cursor > offset {
                entries.push((name.to_string(), self.attr(child)?, cursor));
            }
        }
        Ok(entries)
    }

    /// File-open check; the handle is the inode itself. Write-intent
    /// flags are refused on this read-only filesystem.
    fn open_file(&self, inode: u64, flags: i32) -> Result<u64> {
        if inode != ROOT_INODE {
            self.index.member(inode)?;
        }
        if flags & libc::O_ACCMODE != libc::O_RDONLY {
            return Err(FsError::PermissionDenied);
        }
        Ok(inode)
    }

    /// Read up to `size` bytes of the file behind `inode` at `offset`.
    ///
    /// Only regular-file members are independently readable; symlinks,
    /// directories and specials are refused.
    fn read_at(&self, inode: u64, offset: i64, size: u32) -> Result<Vec<u8>> {
        let index = self.index.member_index(inode).ok_or(FsError::NotFound)?;
        let member = self.index.member(inode)?;
        if member.kind != MemberKind::Regular {
            return Err(FsError::PermissionDenied);
        }
        if offset < 0 {
            return Err(FsError::InvalidArgument(format!(
                "negative read offset {offset}"
            )));
        }
        Ok(self.archive.read_member_at(index, offset as u64, size as usize)?)
    }

    /// Volume statistics: exact archive byte size as the block total,
    /// nothing free or available on a read-only mount.
    fn statistics(&self) -> VolumeStats {
        VolumeStats {
            blocks: self.archive.byte_size(),
            bfree: 0,
            bavail: 0,
            files: self.index.member_count() as u64 + 1,
            ffree: 0,
            bsize: 4096,
            frsize: STATFS_FRSIZE,
            namelen: 255,
        }
    }
}

impl Filesystem for TarFuseFS {
    fn getattr(&mut self, _req: &Request, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        trace!("getattr(ino={})", ino);

        match self.attr(ino) {
            Ok(attr) => reply.attr(&TTL, &attr),
            Err(err) => {
                warn!("getattr: inode {}: {}", ino, err);
                reply.error(err.errno());
            }
        }
    }

    fn lookup(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let name = name.to_string_lossy();
        trace!("lookup(parent={}, name='{}')", parent, name);

        match self.lookup_entry(parent, &name) {
            Ok(attr) => reply.entry(&TTL, &attr, 0),
            Err(err) => {
                debug!("lookup: '{}' under inode {}: {}", name, parent, err);
                reply.error(err.errno());
            }
        }
    }

    fn opendir(&mut self, _req: &Request, ino: u64, _flags: i32, reply: ReplyOpen) {
        trace!("opendir(ino={})", ino);

        match self.open_dir(ino) {
            Ok(handle) => reply.opened(handle, 0),
            Err(err) => {
                debug!("opendir: inode {}: {}", ino, err);
                reply.error(err.errno());
            }
        }
    }

    fn readdir(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        trace!("readdir(ino={}, offset={})", ino, offset);

        let entries = match self.read_dir(ino, offset.max(0) as u64) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("readdir: inode {}: {}", ino, err);
                reply.error(err.errno());
                return;
            }
        };

        for (name, attr, cursor) in entries {
            // The cursor is the offset to resume from once the buffer fills.
            if reply.add(attr.ino, cursor as i64, attr.kind, &name) {
                break;
            }
        }
        reply.ok();
    }

    fn open(&mut self, _req: &Request, ino: u64, flags: i32, reply: ReplyOpen) {
        trace!("open(ino={}, flags={:#o})", ino, flags);

        match self.open_file(ino, flags) {
            Ok(handle) => reply.opened(handle, 0),
            Err(err) => {
                debug!("open: inode {}: {}", ino, err);
                reply.error(open_errno(&err));
            }
        }
    }

    fn read(
        &mut self,
        _req: &Request,
        _ino: u64,
        fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        trace!("read(fh={}, offset={}, size={})", fh, offset, size);

        match self.read_at(fh, offset, size) {
            Ok(data) => reply.data(&data),
            Err(err) => {
                warn!("read: handle {}: {}", fh, err);
                reply.error(err.errno());
            }
        }
    }

    fn statfs(&mut self, _req: &Request, _ino: u64, reply: fuser::ReplyStatfs) {
        trace!("statfs");

        let stats = self.statistics();
        reply.statfs(
            stats.blocks,
            stats.bfree,
            stats.bavail,
            stats.files,
            stats.ffree,
            stats.bsize,
            stats.namelen,
            stats.frsize,
        );
    }
}

/// Mount a tar archive as a read-only FUSE filesystem.
///
/// Blocks until the filesystem is unmounted. `debug_fuse` enables
/// FUSE-level debug tracing for the session.
pub fn mount<P: AsRef<Path>>(fs: TarFuseFS, mount_point: P, debug_fuse: bool) -> io::Result<()> {
    let mount_point = mount_point.as_ref();
    let options = mount_options(debug_fuse);

    debug!(
        "mounting {} members at {}",
        fs.member_count(),
        mount_point.display()
    );

    fuser::mount2(fs, mount_point, &options)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("FUSE mount failed: {}", e)))
}

/// Mount in the background and return a session handle.
///
/// The filesystem stays mounted until the returned session is dropped or
/// `unmount()` is called on it.
pub fn mount_background<P: AsRef<Path>>(
    fs: TarFuseFS,
    mount_point: P,
    debug_fuse: bool,
) -> io::Result<fuser::BackgroundSession> {
    let mount_point = mount_point.as_ref();
    let options = mount_options(debug_fuse);

    debug!(
        "mounting {} members at {} (background)",
        fs.member_count(),
        mount_point.display()
    );

    fuser::spawn_mount2(fs, mount_point, &options)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("FUSE mount failed: {}", e)))
}

/// errno for a failed `open`: a refused write-intent is an access
/// refusal (EACCES), unlike the kind-mismatch EPERM that `read` reports.
fn open_errno(err: &FsError) -> i32 {
    match err {
        FsError::PermissionDenied => libc::EACCES,
        other => other.errno(),
    }
}

fn mount_options(debug_fuse: bool) -> Vec<MountOption> {
    let mut options = vec![
        MountOption::RO,
        MountOption::FSName("tarfs".to_string()),
        MountOption::Subtype("tar".to_string()),
        MountOption::DefaultPermissions,
    ];
    if debug_fuse {
        options.push(MountOption::CUSTOM("debug".to_string()));
    }
    options
}
