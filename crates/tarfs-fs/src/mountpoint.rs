//! Mount-point resolution for the mount entry point.

use crate::error::{FsError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve the directory to mount at.
///
/// An explicit `mount_path` is taken as-is. Otherwise the mount point is
/// derived from the archive path by dropping its final extension
/// (`data.tar` mounts at `data`); the derived directory must already
/// exist unless `create_missing` is set.
pub fn resolve_mount_point(
    archive: &Path,
    mount_path: Option<&Path>,
    create_missing: bool,
) -> Result<PathBuf> {
    if let Some(explicit) = mount_path {
        return Ok(explicit.to_path_buf());
    }

    if archive.extension().is_none() {
        return Err(FsError::InvalidArgument(
            "cannot derive a mount point from an extension-less archive path, \
             pass one explicitly"
                .to_string(),
        ));
    }

    let derived = archive.with_extension("");
    if derived.as_os_str().is_empty() {
        return Err(FsError::InvalidArgument(
            "please specify a correct mount point".to_string(),
        ));
    }

    if !derived.exists() {
        if create_missing {
            fs::create_dir(&derived)?;
            return Ok(derived);
        }
        return Err(FsError::InvalidArgument(format!(
            "mount point '{}' does not exist",
            derived.display()
        )));
    }

    if derived.is_dir() {
        Ok(derived)
    } else {
        Err(FsError::InvalidArgument(format!(
            "mount point '{}' is not a directory",
            derived.display()
        )))
    }
}
