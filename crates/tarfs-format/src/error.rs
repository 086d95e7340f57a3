use thiserror::Error;

/// Errors that can occur when decoding tar archives.
#[derive(Debug, Error)]
pub enum Error {
    /// A member index is outside the archive's member list.
    #[error("no member at index {0}")]
    MemberNotFound(usize),

    /// I/O error on the backing archive file; tar parse failures
    /// surface here too, as the `tar` crate reports them as I/O errors.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for tarfs-format operations.
pub type Result<T> = std::result::Result<T, Error>;
