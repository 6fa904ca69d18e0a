//! Error types
//!
//! Defines the terminal failure kinds of a storage verification run.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Storage verification errors
///
/// Every variant is terminal: the run stops at the first one and reports it.
#[derive(Debug)]
pub enum VerifyError {
    /// The target file is missing, usually because the storage is not mounted.
    StorageNotMounted { path: PathBuf },
    /// A write call stored fewer bytes than the chunk size, or failed outright
    /// (`source` set, `written` 0).
    WriteError {
        chunk_size: usize,
        iteration: usize,
        written: usize,
        source: Option<io::Error>,
    },
    /// A read call returned fewer bytes than the chunk size, or failed outright
    /// (`source` set, `read` 0).
    ReadError {
        chunk_size: usize,
        iteration: usize,
        read: usize,
        source: Option<io::Error>,
    },
    /// The durability barrier after a write failed.
    SyncError {
        chunk_size: usize,
        iteration: usize,
        source: io::Error,
    },
    /// Read-back data differs from the written pattern.
    ComparisonError {
        chunk_size: usize,
        iteration: usize,
        offset: usize,
        expected: u8,
        actual: u8,
    },
    /// Opening or closing the file failed.
    Io {
        operation: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

impl VerifyError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        VerifyError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Chunk size the failure happened at, if it happened inside a pass
    pub fn chunk_size(&self) -> Option<usize> {
        self.position().map(|(chunk_size, _)| chunk_size)
    }

    /// Chunk size and iteration index the failure happened at
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            VerifyError::WriteError {
                chunk_size,
                iteration,
                ..
            }
            | VerifyError::ReadError {
                chunk_size,
                iteration,
                ..
            }
            | VerifyError::SyncError {
                chunk_size,
                iteration,
                ..
            }
            | VerifyError::ComparisonError {
                chunk_size,
                iteration,
                ..
            } => Some((*chunk_size, *iteration)),
            VerifyError::StorageNotMounted { .. } | VerifyError::Io { .. } => None,
        }
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::StorageNotMounted { path } => {
                write!(f, "File {} not found, storage not mounted", path.display())
            }
            VerifyError::WriteError {
                chunk_size,
                iteration,
                source: Some(e),
                ..
            } => write!(
                f,
                "Write error: {}-byte chunk {} failed: {}",
                chunk_size, iteration, e
            ),
            VerifyError::WriteError {
                chunk_size,
                iteration,
                written,
                source: None,
            } => write!(
                f,
                "Write error: {} of {} bytes written at iteration {}",
                written, chunk_size, iteration
            ),
            VerifyError::ReadError {
                chunk_size,
                iteration,
                source: Some(e),
                ..
            } => write!(
                f,
                "Read error: {}-byte chunk {} failed: {}",
                chunk_size, iteration, e
            ),
            VerifyError::ReadError {
                chunk_size,
                iteration,
                read,
                source: None,
            } => write!(
                f,
                "Read error: {} of {} bytes read at iteration {}",
                read, chunk_size, iteration
            ),
            VerifyError::SyncError {
                chunk_size,
                iteration,
                source,
            } => write!(
                f,
                "Sync error after {}-byte chunk {}: {}",
                chunk_size, iteration, source
            ),
            VerifyError::ComparisonError {
                chunk_size,
                iteration,
                offset,
                expected,
                actual,
            } => write!(
                f,
                "Comparison error: byte {} of {}-byte chunk {}: {} != {}",
                offset, chunk_size, iteration, actual, expected
            ),
            VerifyError::Io {
                operation,
                path,
                source,
            } => write!(f, "I/O error during {} on {}: {}", operation, path.display(), source),
        }
    }
}

impl std::error::Error for VerifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VerifyError::WriteError { source, .. } | VerifyError::ReadError { source, .. } => {
                source
                    .as_ref()
                    .map(|e| e as &(dyn std::error::Error + 'static))
            }
            VerifyError::SyncError { source, .. } | VerifyError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_comparison_error_reports_context() {
        let err = VerifyError::ComparisonError {
            chunk_size: 512,
            iteration: 3,
            offset: 17,
            expected: 28,
            actual: 0xff,
        };
        let msg = err.to_string();
        assert!(msg.contains("byte 17"));
        assert!(msg.contains("512-byte chunk 3"));
        assert_eq!(err.chunk_size(), Some(512));
        assert_eq!(err.position(), Some((512, 3)));
    }

    #[test]
    fn test_failed_write_call_keeps_position_and_cause() {
        let err = VerifyError::WriteError {
            chunk_size: 512,
            iteration: 2,
            written: 0,
            source: Some(io::Error::from_raw_os_error(libc::EIO)),
        };
        assert_eq!(err.position(), Some((512, 2)));
        assert!(err.source().is_some());
        let msg = err.to_string();
        assert!(msg.contains("512-byte chunk 2"));
        assert!(msg.starts_with("Write error"));
    }

    #[test]
    fn test_short_read_has_no_cause() {
        let err = VerifyError::ReadError {
            chunk_size: 256,
            iteration: 5,
            read: 255,
            source: None,
        };
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "Read error: 255 of 256 bytes read at iteration 5");
    }

    #[test]
    fn test_sync_error_reports_position() {
        let err = VerifyError::SyncError {
            chunk_size: 4096,
            iteration: 0,
            source: io::Error::other("flash write timeout"),
        };
        assert_eq!(err.position(), Some((4096, 0)));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("4096-byte chunk 0"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = VerifyError::io("close", "/fs/mtd_params", io::Error::other("device gone"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("close"));
        assert_eq!(err.chunk_size(), None);
    }
}
