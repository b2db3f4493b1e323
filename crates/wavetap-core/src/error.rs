use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Framing errors
    #[error("Payload size mismatch: expected {expected} bytes, got {actual}")]
    PayloadSizeMismatch { expected: usize, actual: usize },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
