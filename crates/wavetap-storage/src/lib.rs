//! Capture file storage for wavetap.
//!
//! Every session flushed by the receive loop ends up as one plain text file:
//! a short `#` header followed by one decimal sample per line. The
//! [`CaptureWriter`] plugs into the receive loop as a
//! [`SampleSink`](wavetap_serial::SampleSink); [`read_capture`] loads a file
//! back for analysis.
//!
//! # Examples
//!
//! ```no_run
//! use wavetap_core::CaptureConfig;
//! use wavetap_storage::{CaptureWriter, CaptureWriterConfig, read_capture};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CaptureConfig::default();
//! let mut writer = CaptureWriter::new(CaptureWriterConfig::from(&config))?;
//!
//! let session = wavetap_core::SessionSummary { samples: vec![10, -10], frames: 1 };
//! if let Some(path) = writer.save(&session)? {
//!     let capture = read_capture(&path)?;
//!     assert_eq!(capture.samples, vec![10, -10]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod format;
pub mod writer;

pub use error::{StorageError, StorageResult};
pub use format::{CaptureFile, parse_capture, read_capture, write_capture};
pub use writer::{CaptureWriter, CaptureWriterConfig, DEFAULT_FILE_PREFIX};
