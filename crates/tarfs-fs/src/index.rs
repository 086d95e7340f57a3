//! Directory-tree semantics over a flat archive member list.
//!
//! Tar archives carry no index from a directory to its children, so every
//! containment query must either rescan the member list or consult a
//! precomputed map. [`ArchiveIndex`] builds the map once at mount time:
//! an inode is the member's list position plus a fixed delta, and each
//! directory path keys an ordered list of child inodes.

use crate::error::{FsError, Result};
use std::collections::HashMap;
use tarfs_format::ArchiveMember;

/// Reserved inode of the synthetic root directory.
///
/// Equals `fuser::FUSE_ROOT_ID`; kept as a plain constant so the index
/// does not depend on the FUSE bindings.
pub const ROOT_INODE: u64 = 1;

/// Offset between a member's list position and its inode number.
const DELTA: u64 = ROOT_INODE + 1;

/// Immutable directory-tree view over an archive's member list.
///
/// Built once when the archive is opened; every query is a pure function
/// of this state, so concurrent dispatch needs no locking. The root is a
/// sentinel inode with no member record behind it.
#[derive(Debug)]
pub struct ArchiveIndex {
    members: Vec<ArchiveMember>,
    /// Directory path ("" for the root) to its child inodes, in member order.
    dir_children: HashMap<String, Vec<u64>>,
    /// Member path to inode; the first member wins on duplicate paths.
    by_path: HashMap<String, u64>,
}

impl ArchiveIndex {
    /// Build the index from the archive's ordered member list.
    pub fn build(members: Vec<ArchiveMember>) -> Self {
        let mut dir_children: HashMap<String, Vec<u64>> = HashMap::new();
        let mut by_path: HashMap<String, u64> = HashMap::new();

        for (i, member) in members.iter().enumerate() {
            let inode = i as u64 + DELTA;
            dir_children
                .entry(member.parent_path().to_string())
                .or_default()
                .push(inode);
            // Archives are assumed not to repeat paths; when one does, the
            // first occurrence in list order wins.
            by_path.entry(member.path.clone()).or_insert(inode);
        }

        Self {
            members,
            dir_children,
            by_path,
        }
    }

    /// Number of members behind this index.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether `inode` is the root or maps to a member.
    pub fn is_valid(&self, inode: u64) -> bool {
        (ROOT_INODE..=ROOT_INODE + self.members.len() as u64).contains(&inode)
    }

    /// Member list position behind `inode`, if it maps to a member.
    pub fn member_index(&self, inode: u64) -> Option<usize> {
        if inode >= DELTA && self.is_valid(inode) {
            Some((inode - DELTA) as usize)
        } else {
            None
        }
    }

    /// Member record behind `inode`.
    pub fn member(&self, inode: u64) -> Result<&ArchiveMember> {
        self.member_index(inode)
            .map(|i| &self.members[i])
            .ok_or(FsError::NotFound)
    }

    /// Stored path of the directory behind `inode`: empty for the root,
    /// the member's own path otherwise.
    fn dir_path(&self, inode: u64) -> Result<&str> {
        if inode == ROOT_INODE {
            Ok("")
        } else {
            Ok(&self.member(inode)?.path)
        }
    }

    /// Resolve `name` under the directory `parent`.
    ///
    /// `.` resolves to `parent` itself. `..` resolves by splitting the
    /// parent's own path and looking that directory path up among the
    /// members; this fails when the enclosing directory is not itself a
    /// member, which includes the root and every top-level entry (the
    /// root's path `""` has no member record). A plain name matches the
    /// first child of `parent` whose final path component equals it.
    pub fn resolve_child(&self, parent: u64, name: &str) -> Result<u64> {
        if !self.is_valid(parent) {
            return Err(FsError::NotFound);
        }

        if name == "." {
            return Ok(parent);
        }

        if name == ".." {
            let enclosing = match self.member_index(parent) {
                Some(i) => self.members[i].parent_path(),
                None => return Err(FsError::NotFound),
            };
            return self.by_path.get(enclosing).copied().ok_or(FsError::NotFound);
        }

        let parent_path = self.dir_path(parent)?;
        let children = self
            .dir_children
            .get(parent_path)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        children
            .iter()
            .copied()
            .find(|&inode| self.members[(inode - DELTA) as usize].file_name() == name)
            .ok_or(FsError::NotFound)
    }

    /// Children of the directory `parent`, in member-list order, each
    /// tagged with a 1-based cursor into the filtered sequence.
    ///
    /// The cursor doubles as a restartable pagination offset: a caller
    /// that resumes from any previously yielded cursor value receives
    /// exactly the entries after it, in the same order.
    pub fn children(&self, parent: u64) -> Result<impl Iterator<Item = (u64, &str, u64)> + '_> {
        let parent_path = self.dir_path(parent)?;
        let slots = self
            .dir_children
            .get(parent_path)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        Ok(slots.iter().enumerate().map(move |(i, &inode)| {
            let member = &self.members[(inode - DELTA) as usize];
            (i as u64 + 1, member.file_name(), inode)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarfs_format::MemberKind;

    fn member(path: &str, kind: MemberKind) -> ArchiveMember {
        ArchiveMember {
            path: path.to_string(),
            kind,
            size: if kind == MemberKind::Regular { 7 } else { 0 },
            mode: 0o644,
            mtime: 1_600_000_000,
        }
    }

    fn sample_index() -> ArchiveIndex {
        ArchiveIndex::build(vec![
            member("513.txt", MemberKind::Regular),    // inode 2
            member("dir1", MemberKind::Directory),     // inode 3
            member("dir1/file1.txt", MemberKind::Regular), // inode 4
            member("dir1/file2.txt", MemberKind::Regular), // inode 5
            member("dir1/sub", MemberKind::Directory), // inode 6
            member("dir1/sub/deep.txt", MemberKind::Regular), // inode 7
        ])
    }

    #[test]
    fn inodes_follow_member_list_order() {
        let index = sample_index();
        assert_eq!(index.member(2).unwrap().path, "513.txt");
        assert_eq!(index.member(7).unwrap().path, "dir1/sub/deep.txt");
    }

    #[test]
    fn out_of_range_inodes_are_rejected() {
        let index = sample_index();
        assert!(index.member(0).is_err());
        assert!(index.member(ROOT_INODE).is_err());
        assert!(index.member(8).is_err());
        assert!(!index.is_valid(0));
        assert!(index.is_valid(ROOT_INODE));
        assert!(index.is_valid(7));
        assert!(!index.is_valid(8));
        assert!(index.children(8).is_err());
        assert!(index.resolve_child(8, "x").is_err());
    }

    #[test]
    fn resolve_child_inverts_path_construction() {
        let index = sample_index();
        let dir1 = index.resolve_child(ROOT_INODE, "dir1").unwrap();
        assert_eq!(index.member(dir1).unwrap().path, "dir1");

        let sub = index.resolve_child(dir1, "sub").unwrap();
        let deep = index.resolve_child(sub, "deep.txt").unwrap();
        assert_eq!(index.member(deep).unwrap().path, "dir1/sub/deep.txt");
    }

    #[test]
    fn dot_resolves_to_parent_itself() {
        let index = sample_index();
        assert_eq!(index.resolve_child(ROOT_INODE, ".").unwrap(), ROOT_INODE);
        assert_eq!(index.resolve_child(3, ".").unwrap(), 3);
    }

    #[test]
    fn dotdot_resolves_through_member_paths() {
        let index = sample_index();
        // "dir1/sub" -> "dir1"
        assert_eq!(index.resolve_child(6, "..").unwrap(), 3);
        // "dir1" sits under the root, which has no member record.
        assert!(index.resolve_child(3, "..").is_err());
        // The root itself has no member parent either.
        assert!(index.resolve_child(ROOT_INODE, "..").is_err());
    }

    #[test]
    fn missing_names_do_not_resolve() {
        let index = sample_index();
        assert!(index.resolve_child(ROOT_INODE, "nope").is_err());
        assert!(index.resolve_child(3, "513.txt").is_err());
    }

    #[test]
    fn children_are_ordered_with_one_based_cursors() {
        let index = sample_index();
        let listed: Vec<_> = index
            .children(3)
            .unwrap()
            .map(|(cursor, name, inode)| (cursor, name.to_string(), inode))
            .collect();
        assert_eq!(
            listed,
            vec![
                (1, "file1.txt".to_string(), 4),
                (2, "file2.txt".to_string(), 5),
                (3, "sub".to_string(), 6),
            ]
        );
    }

    #[test]
    fn listing_a_file_inode_yields_nothing() {
        let index = sample_index();
        assert_eq!(index.children(2).unwrap().count(), 0);
    }

    #[test]
    fn duplicate_paths_resolve_to_first_occurrence() {
        let index = ArchiveIndex::build(vec![
            member("twin.txt", MemberKind::Regular), // inode 2
            member("twin.txt", MemberKind::Regular), // inode 3
        ]);
        assert_eq!(index.resolve_child(ROOT_INODE, "twin.txt").unwrap(), 2);
        // Both still appear when listing; only name resolution collapses.
        assert_eq!(index.children(ROOT_INODE).unwrap().count(), 2);
    }

    /// The precomputed map must agree with a naive linear rescan of the
    /// member list for every directory.
    #[test]
    fn precomputed_map_matches_linear_rescan() {
        let index = sample_index();
        let members: Vec<ArchiveMember> = (0..index.member_count())
            .map(|i| index.member(i as u64 + 2).unwrap().clone())
            .collect();

        let mut parents: Vec<u64> = vec![ROOT_INODE];
        parents.extend((0..members.len()).map(|i| i as u64 + 2));

        for parent in parents {
            let parent_path = if parent == ROOT_INODE {
                String::new()
            } else {
                members[(parent - 2) as usize].path.clone()
            };

            let naive: Vec<(u64, String, u64)> = members
                .iter()
                .enumerate()
                .filter(|(_, m)| m.parent_path() == parent_path)
                .enumerate()
                .map(|(pos, (i, m))| (pos as u64 + 1, m.file_name().to_string(), i as u64 + 2))
                .collect();

            let indexed: Vec<(u64, String, u64)> = index
                .children(parent)
                .unwrap()
                .map(|(cursor, name, inode)| (cursor, name.to_string(), inode))
                .collect();

            assert_eq!(indexed, naive, "mismatch under inode {}", parent);
        }
    }
}
