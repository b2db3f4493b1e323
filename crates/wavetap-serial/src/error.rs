//! Error types for transport operations.
//!
//! This module defines the errors raised while reading from a byte source,
//! writing console commands to the board, or handing results to a sink.

use std::path::PathBuf;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while capturing from a byte source.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The source has no more bytes and never will.
    ///
    /// This ends a receive loop normally, with a final session flush.
    #[error("Byte source closed")]
    SourceClosed,

    /// The serial device could not be opened.
    #[error("Failed to open {}: {}", .path.display(), .message)]
    Open { path: PathBuf, message: String },

    /// Serial driver error.
    #[error("Serial error: {0}")]
    Serial(#[from] serialport::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A sample sink failed to accept a session.
    #[error("Sink error: {0}")]
    Sink(String),

    /// Configuration or framing error.
    #[error(transparent)]
    Core(#[from] wavetap_core::Error),
}

impl TransportError {
    /// Create a new open error.
    pub fn open(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Open {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new sink error.
    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink(message.into())
    }

    /// Whether this error only signals the end of the stream.
    pub fn is_source_closed(&self) -> bool {
        matches!(self, Self::SourceClosed)
    }
}
