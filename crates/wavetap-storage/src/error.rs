use std::path::PathBuf;

use thiserror::Error;

/// Storage-specific error types for capture files.
///
/// These errors represent failures while creating the output directory,
/// writing a capture, or reading one back.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output path exists but is not a directory
    #[error("Not a directory: {}", .0.display())]
    InvalidDirectory(PathBuf),

    /// Capture file content does not follow the capture format
    #[error("Malformed capture file at line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for wavetap_serial::TransportError {
    fn from(error: StorageError) -> Self {
        wavetap_serial::TransportError::sink(error.to_string())
    }
}
