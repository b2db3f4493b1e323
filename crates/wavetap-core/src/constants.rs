//! Wire-level constants for the waveform print stream.
//!
//! The acoustic modem board prints its received waveform over USB serial as
//! fixed-size binary frames interleaved with its regular console text:
//!
//! ```text
//! <MARKER><PAYLOAD><TRAILER>
//! "DATA"  1024 bytes  AA BB CC DD
//! ```
//!
//! Where:
//! - `MARKER` - `DATA` for a chunk of an ongoing capture, `TERM` for the last chunk
//! - `PAYLOAD` - little-endian signed 16-bit samples
//! - `TRAILER` - constant integrity marker closing every frame
//!
//! # Usage
//!
//! ```
//! use wavetap_core::constants::*;
//!
//! assert_eq!(DATA_MARKER, *b"DATA");
//! assert_eq!(MARKER_LEN + DEFAULT_PAYLOAD_SIZE + TRAILER_LEN, DEFAULT_FRAME_LEN);
//! ```
//!
//! These values must match the firmware. Changing them breaks compatibility
//! with existing captures.

// ============================================================================
// Frame Layout
// ============================================================================

/// Length of a frame marker in bytes.
pub const MARKER_LEN: usize = 4;

/// Marker opening a data frame (a chunk of an ongoing capture).
pub const DATA_MARKER: [u8; MARKER_LEN] = *b"DATA";

/// Marker opening the terminal frame of a capture.
///
/// The terminal frame carries samples like a data frame and additionally
/// closes the current session.
pub const TERM_MARKER: [u8; MARKER_LEN] = *b"TERM";

/// Length of the frame trailer in bytes.
pub const TRAILER_LEN: usize = 4;

/// Constant integrity trailer following every payload.
pub const FRAME_TRAILER: [u8; TRAILER_LEN] = [0xAA, 0xBB, 0xCC, 0xDD];

/// Default payload size in bytes (512 samples).
pub const DEFAULT_PAYLOAD_SIZE: usize = 1024;

/// Largest payload size a configuration may ask for (1 MB).
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Total length of a frame with the default payload size.
pub const DEFAULT_FRAME_LEN: usize = MARKER_LEN + DEFAULT_PAYLOAD_SIZE + TRAILER_LEN;

/// Size of one encoded sample in bytes.
pub const SAMPLE_SIZE: usize = 2;

// ============================================================================
// Text Handling
// ============================================================================

/// Default number of bytes examined when looking for a line of text.
pub const DEFAULT_TEXT_LOOKAHEAD: usize = 100;

/// Default buffer size above which unterminated text is emitted anyway.
pub const DEFAULT_TEXT_FLUSH_THRESHOLD: usize = 1000;

/// Line delimiter for console text.
pub const NEWLINE: u8 = b'\n';

/// Replacement for bytes outside the ASCII range in console text.
pub const REPLACEMENT_CHAR: char = '\u{FFFD}';

// ============================================================================
// Serial Transport
// ============================================================================

/// Default baud rate of the board's USB CDC port.
pub const DEFAULT_BAUD_RATE: u32 = 3_686_400;

/// Default serial read timeout in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

/// Default cap on a single serial read, in bytes (256 KB).
pub const DEFAULT_RX_BUFFER_SIZE: usize = 256 * 1024;

/// Default sleep between polls when no data is available, in milliseconds.
pub const DEFAULT_IDLE_SLEEP_MS: u64 = 1;

/// Default directory for capture files.
pub const DEFAULT_OUTPUT_DIR: &str = "acoustic_data";

/// Default text sent through the feedback menu when arming the device.
pub const DEFAULT_FEEDBACK_TEXT: &str = "test";

/// Number of frames between progress reports.
pub const PROGRESS_INTERVAL_FRAMES: u64 = 10;
