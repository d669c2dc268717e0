//! The one error family used across the crate.
//!
//! Every fallible operation returns [`GitletError`], which carries an
//! [`ErrorKind`] callers can match on plus enough context to explain what
//! went wrong. This mirrors how Git itself distinguishes a handful of
//! failure classes (missing object, corrupt object, dirty working tree, ...)
//! rather than exposing raw `io::Error` everywhere.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Discriminates the failure classes the core can raise.
///
/// Kept as a plain enum, separate from [`GitletError`] itself, so callers
/// can match on `err.kind()` without destructuring the variant's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A file is missing, not a regular file, or unreadable.
    NotReadable,
    /// `remove` was called on a path that is neither tracked nor staged.
    PathspecNoMatch,
    /// `remove` without `force` hit a tracked, modified working-tree file.
    HasLocalModifications,
    /// The object store has no object for the requested uid.
    NotFound,
    /// A stored object failed header parsing, size validation, or hash
    /// verification on read-back.
    Corrupt,
    /// The compression codec rejected malformed input.
    Format,
    /// Any other underlying filesystem error.
    Io,
}

/// The error type returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum GitletError {
    #[error("'{0}' is missing, not a regular file, or unreadable")]
    NotReadable(PathBuf),

    #[error("pathspec '{0}' did not match any files")]
    PathspecNoMatch(String),

    #[error("'{0}' has local modifications; use force to override")]
    HasLocalModifications(String),

    #[error("object {0} not found")]
    NotFound(String),

    #[error("object {uid} is corrupt: {reason}")]
    Corrupt { uid: String, reason: String },

    #[error("format error: {0}")]
    Format(String),

    #[error("{0}")]
    Io(#[source] #[from] io::Error),
}

impl GitletError {
    /// The discriminant callers should match on, independent of the
    /// variant's payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GitletError::NotReadable(_) => ErrorKind::NotReadable,
            GitletError::PathspecNoMatch(_) => ErrorKind::PathspecNoMatch,
            GitletError::HasLocalModifications(_) => ErrorKind::HasLocalModifications,
            GitletError::NotFound(_) => ErrorKind::NotFound,
            GitletError::Corrupt { .. } => ErrorKind::Corrupt,
            GitletError::Format(_) => ErrorKind::Format,
            GitletError::Io(_) => ErrorKind::Io,
        }
    }

    /// Shorthand for [`ErrorKind::NotReadable`] naming the offending path.
    pub fn not_readable(path: impl Into<PathBuf>) -> Self {
        GitletError::NotReadable(path.into())
    }

    /// Shorthand for [`ErrorKind::PathspecNoMatch`] naming the basename Git
    /// would print.
    pub fn pathspec_no_match(name: impl Into<String>) -> Self {
        GitletError::PathspecNoMatch(name.into())
    }

    /// Shorthand for [`ErrorKind::HasLocalModifications`] naming the
    /// basename.
    pub fn has_local_modifications(name: impl Into<String>) -> Self {
        GitletError::HasLocalModifications(name.into())
    }

    /// Shorthand for [`ErrorKind::NotFound`] naming the missing uid.
    pub fn not_found(uid: impl Into<String>) -> Self {
        GitletError::NotFound(uid.into())
    }

    /// Shorthand for [`ErrorKind::Corrupt`] naming the uid and the reason.
    pub fn corrupt(uid: impl Into<String>, reason: impl Into<String>) -> Self {
        GitletError::Corrupt {
            uid: uid.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ErrorKind::Format`].
    pub fn format(reason: impl Into<String>) -> Self {
        GitletError::Format(reason.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GitletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = GitletError::not_found("deadbeef");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("deadbeef"));
    }

    #[test]
    fn io_error_converts_with_io_kind() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: GitletError = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn corrupt_carries_uid_and_reason() {
        let err = GitletError::corrupt("abc123", "hash mismatch");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert!(err.to_string().contains("abc123"));
        assert!(err.to_string().contains("hash mismatch"));
    }
}
