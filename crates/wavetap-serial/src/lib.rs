//! Transport layer for the wavetap capture tool.
//!
//! This crate connects the stream demultiplexer to the outside world. It
//! defines the collaborator traits the receive loop talks to, and ships the
//! implementations the capture tool needs:
//!
//! - [`SerialByteSource`]: reads the board's serial port (`serialport` crate)
//! - [`MockByteSource`]: replays scripted reads for tests and demos
//! - [`StdoutText`] and [`ProgressReporter`]: console text and progress logging
//! - [`ConsoleCommand`]: keystroke sequences that drive the board's menu
//! - [`Receiver`]: the poll-driven loop tying a source to the sinks
//!
//! # Example
//!
//! ```
//! use tokio_util::sync::CancellationToken;
//! use wavetap_core::MarkerKind;
//! use wavetap_protocol::Frame;
//! use wavetap_serial::mock::{MockByteSource, RecordingSink};
//! use wavetap_serial::Receiver;
//!
//! let mut stream = b"Menu:\r\n".to_vec();
//! stream.extend_from_slice(&Frame::from_samples(MarkerKind::Terminal, &[0; 512]).to_wire());
//!
//! let mut receiver = Receiver::new(MockByteSource::chunked(&stream, 64));
//! let mut text = RecordingSink::new();
//! let mut samples = RecordingSink::new();
//! receiver.run(&mut text, &mut samples, &CancellationToken::new()).unwrap();
//!
//! assert_eq!(text.text(), "Menu:\r\n");
//! assert_eq!(samples.sessions[0].sample_count(), 512);
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`][error::Result] with the
//! [`TransportError`] type.

pub mod console;
pub mod error;
pub mod mock;
pub mod receiver;
pub mod serial;
pub mod sinks;
pub mod traits;

// Re-export commonly used types for convenience
pub use console::{ConsoleCommand, KEYSTROKE_GAP};
pub use error::{Result, TransportError};
pub use mock::{MockByteSource, RecordingSink};
pub use receiver::{ReceiveSummary, Receiver, StopReason};
pub use serial::SerialByteSource;
pub use sinks::{ConsoleText, ProgressReporter, StdoutText};
pub use traits::{ByteSource, SampleSink, TextSink};
