//! Error types for occurrence counting.
//!
//! Every failure is terminal for a run: the engine either returns a single
//! validated total or one of these errors, never a partial count.
use std::path::PathBuf;
use thiserror::Error;

/// Result type for counting operations
pub type CountResult<T> = Result<T, CountError>;

/// Errors that can occur while loading inputs or counting occurrences
#[derive(Error, Debug)]
pub enum CountError {
    #[error("Invalid pattern: the pattern must contain at least one byte")]
    EmptyPattern,
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Failed to allocate {bytes} bytes for chunk {chunk}")]
    AllocationFailed { chunk: usize, bytes: usize },
    #[error("Worker pool error: {0}")]
    ThreadPool(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Failed to read {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CountError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn allocation_failed(chunk: usize, bytes: usize) -> Self {
        Self::AllocationFailed { chunk, bytes }
    }

    pub fn thread_pool(msg: impl Into<String>) -> Self {
        Self::ThreadPool(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Maps an I/O error raised while opening or reading `path`
    pub fn from_io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::read_failed(path, err),
        }
    }
}
