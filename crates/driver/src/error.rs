//! Driver Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};

/// A driver error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// File or device node does not exist
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied to a device node or cache record
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// The read was interrupted before it completed
    #[display("interrupted")]
    Interrupted,
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Path is relative, empty, or otherwise unusable as a record location
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// EEPROM contents could not be decoded
    #[display("malformed EEPROM data: {_0}")]
    Malformed(#[error(not(source))] String),
    /// Cache was used before an identity was bound to it
    #[display("cache identity not configured")]
    Unbound,
    /// Database tier failed (connection, query, or stored data)
    #[display("database error")]
    Database,
    /// Hardware access failed below the file layer
    #[display("hardware error: {_0}")]
    Hardware(#[error(not(source))] String),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}
impl ErrorKind {
    /// Classify an I/O error that happened while accessing `path`.
    pub fn io(err: IoError, path: &Path) -> Self {
        match err.kind() {
            IoErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            IoErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            IoErrorKind::Interrupted => Self::Interrupted,
            _ => Self::Io(err),
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Interrupted | Self::Io(_) | Self::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(IoErrorKind::NotFound, "file not found: /dev/eeprom")]
    #[case(IoErrorKind::PermissionDenied, "permission denied: /dev/eeprom")]
    #[case(IoErrorKind::Interrupted, "interrupted")]
    fn test_io_classification(#[case] kind: IoErrorKind, #[case] expected: &str) {
        let err = ErrorKind::io(IoError::from(kind), Path::new("/dev/eeprom"));
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_unclassified_io_is_kept() {
        let err = ErrorKind::io(IoError::other("bus stuck"), Path::new("/dev/eeprom"));
        assert!(matches!(err, ErrorKind::Io(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_retryable() {
        assert!(!ErrorKind::Malformed("short".to_string()).is_retryable());
        assert!(!ErrorKind::Unbound.is_retryable());
        assert!(ErrorKind::Interrupted.is_retryable());
    }
}
