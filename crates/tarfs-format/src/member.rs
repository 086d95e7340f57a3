use tar::EntryType;

/// Kind of one archive member, as a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Directory entry.
    Directory,
    /// Regular file with content bytes.
    Regular,
    /// Symbolic link; the target is metadata only and is not resolved.
    Symlink,
    /// Hard link to another member; the target is not resolved to an inode.
    Hardlink,
    /// FIFO special file.
    Fifo,
    /// Character device special file.
    CharDevice,
    /// Entry types outside the closed set (extended headers and the like).
    Unspecified,
}

impl From<EntryType> for MemberKind {
    fn from(entry_type: EntryType) -> Self {
        match entry_type {
            EntryType::Directory => MemberKind::Directory,
            EntryType::Regular | EntryType::Continuous => MemberKind::Regular,
            EntryType::Symlink => MemberKind::Symlink,
            EntryType::Link => MemberKind::Hardlink,
            EntryType::Fifo => MemberKind::Fifo,
            EntryType::Char => MemberKind::CharDevice,
            _ => MemberKind::Unspecified,
        }
    }
}

/// One entry from the archive's member list.
///
/// Immutable once scanned; the member list is owned by whoever builds the
/// directory index over it.
#[derive(Debug, Clone)]
pub struct ArchiveMember {
    /// Slash-separated archive-relative path, no leading or trailing slash.
    pub path: String,
    /// Entry kind.
    pub kind: MemberKind,
    /// Content size in bytes; meaningful only for regular files.
    pub size: u64,
    /// POSIX permission bits as stored in the archive.
    pub mode: u32,
    /// Modification time, seconds since the epoch.
    pub mtime: u64,
}

impl ArchiveMember {
    /// Final path component.
    pub fn file_name(&self) -> &str {
        match self.path.rfind('/') {
            Some(i) => &self.path[i + 1..],
            None => &self.path,
        }
    }

    /// Directory component of the path; empty for top-level members.
    pub fn parent_path(&self) -> &str {
        match self.path.rfind('/') {
            Some(i) => &self.path[..i],
            None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(path: &str) -> ArchiveMember {
        ArchiveMember {
            path: path.to_string(),
            kind: MemberKind::Regular,
            size: 0,
            mode: 0o644,
            mtime: 0,
        }
    }

    #[test]
    fn path_components() {
        let m = member("a/b/c.txt");
        assert_eq!(m.file_name(), "c.txt");
        assert_eq!(m.parent_path(), "a/b");
    }

    #[test]
    fn top_level_member_has_empty_parent() {
        let m = member("c.txt");
        assert_eq!(m.file_name(), "c.txt");
        assert_eq!(m.parent_path(), "");
    }

    #[test]
    fn entry_type_mapping() {
        assert_eq!(MemberKind::from(EntryType::Directory), MemberKind::Directory);
        assert_eq!(MemberKind::from(EntryType::Regular), MemberKind::Regular);
        assert_eq!(MemberKind::from(EntryType::Symlink), MemberKind::Symlink);
        assert_eq!(MemberKind::from(EntryType::Link), MemberKind::Hardlink);
        assert_eq!(MemberKind::from(EntryType::Fifo), MemberKind::Fifo);
        assert_eq!(MemberKind::from(EntryType::Char), MemberKind::CharDevice);
        assert_eq!(
            MemberKind::from(EntryType::XGlobalHeader),
            MemberKind::Unspecified
        );
    }
}
