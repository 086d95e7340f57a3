use thiserror::Error;

/// Filesystem-level errors surfaced to the dispatch layer.
///
/// None of these are retried internally; retry is the syscall issuer's
/// decision.
#[derive(Debug, Error)]
pub enum FsError {
    /// Inode or name does not resolve.
    #[error("entry not found")]
    NotFound,

    /// Operation not supported on this entry kind, or a write attempt.
    #[error("operation not permitted")]
    PermissionDenied,

    /// Backing content stream unavailable or failed mid-read.
    #[error("archive IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed request.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<tarfs_format::Error> for FsError {
    fn from(err: tarfs_format::Error) -> Self {
        match err {
            tarfs_format::Error::MemberNotFound(_) => FsError::NotFound,
            tarfs_format::Error::IoError(err) => FsError::Io(err),
        }
    }
}

#[cfg(feature = "fuse")]
impl FsError {
    /// The errno reported to the FUSE dispatch layer.
    pub fn errno(&self) -> i32 {
        match self {
            FsError::NotFound => libc::ENOENT,
            FsError::PermissionDenied => libc::EPERM,
            FsError::Io(_) => libc::EIO,
            FsError::InvalidArgument(_) => libc::EINVAL,
        }
    }
}

/// Result type for tarfs-fs operations.
pub type Result<T> = std::result::Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_errors_map_into_the_taxonomy() {
        assert!(matches!(
            FsError::from(tarfs_format::Error::MemberNotFound(3)),
            FsError::NotFound
        ));

        let io = tarfs_format::Error::IoError(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "truncated archive",
        ));
        assert!(matches!(FsError::from(io), FsError::Io(_)));
    }

    #[cfg(feature = "fuse")]
    #[test]
    fn errno_values_follow_the_taxonomy() {
        assert_eq!(FsError::NotFound.errno(), libc::ENOENT);
        assert_eq!(FsError::PermissionDenied.errno(), libc::EPERM);
        assert_eq!(
            FsError::Io(std::io::Error::new(std::io::ErrorKind::Other, "stream gone")).errno(),
            libc::EIO
        );
        assert_eq!(
            FsError::InvalidArgument("bad offset".to_string()).errno(),
            libc::EINVAL
        );
    }
}
