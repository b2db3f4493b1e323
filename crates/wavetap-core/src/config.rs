//! Runtime configuration.
//!
//! [`DemuxConfig`] holds the framing parameters of the demultiplexer.
//! [`CaptureConfig`] adds the serial transport and output settings used by
//! the capture tool. Both deserialize from JSON with every field optional;
//! missing fields take the documented defaults.
//!
//! ```
//! use wavetap_core::CaptureConfig;
//!
//! let config: CaptureConfig = serde_json::from_str(r#"{ "port": "/dev/ttyACM0" }"#).unwrap();
//! assert_eq!(config.port, "/dev/ttyACM0");
//! assert_eq!(config.baud_rate, 3_686_400);
//! assert_eq!(config.demux.payload_size, 1024);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_FEEDBACK_TEXT, DEFAULT_IDLE_SLEEP_MS, DEFAULT_OUTPUT_DIR,
    DEFAULT_PAYLOAD_SIZE, DEFAULT_READ_TIMEOUT_MS, DEFAULT_RX_BUFFER_SIZE,
    DEFAULT_TEXT_FLUSH_THRESHOLD, DEFAULT_TEXT_LOOKAHEAD, MARKER_LEN, MAX_PAYLOAD_SIZE,
};
use crate::{Error, Result};

/// Framing parameters for the stream demultiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemuxConfig {
    /// Payload size of every frame in bytes (default: 1024).
    pub payload_size: usize,

    /// Bytes examined when looking for a newline in marker-free text (default: 100).
    pub text_lookahead: usize,

    /// Buffer length above which marker-free text without a newline is
    /// emitted anyway, `text_lookahead` bytes at a time (default: 1000).
    pub text_flush_threshold: usize,
}

impl Default for DemuxConfig {
    fn default() -> Self {
        Self {
            payload_size: DEFAULT_PAYLOAD_SIZE,
            text_lookahead: DEFAULT_TEXT_LOOKAHEAD,
            text_flush_threshold: DEFAULT_TEXT_FLUSH_THRESHOLD,
        }
    }
}

impl DemuxConfig {
    /// Config with a custom payload size and default text limits.
    #[must_use]
    pub fn with_payload_size(payload_size: usize) -> Self {
        Self {
            payload_size,
            ..Self::default()
        }
    }

    /// Check that the parameters can drive the demultiplexer.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if the payload size or lookahead is zero,
    /// if the payload size exceeds [`MAX_PAYLOAD_SIZE`], or if the flush
    /// threshold does not leave room for a partial marker behind the
    /// lookahead window.
    pub fn validate(&self) -> Result<()> {
        if self.payload_size == 0 {
            return Err(Error::InvalidConfig(
                "payload_size must be greater than 0".to_string(),
            ));
        }
        if self.payload_size > MAX_PAYLOAD_SIZE {
            return Err(Error::InvalidConfig(format!(
                "payload_size ({}) must not exceed {MAX_PAYLOAD_SIZE}",
                self.payload_size
            )));
        }
        if self.text_lookahead == 0 {
            return Err(Error::InvalidConfig(
                "text_lookahead must be greater than 0".to_string(),
            ));
        }
        // A forced flush must never cut into a marker still arriving at the tail.
        let min_threshold = self.text_lookahead.checked_add(MARKER_LEN).ok_or_else(|| {
            Error::InvalidConfig(format!("text_lookahead ({}) is too large", self.text_lookahead))
        })?;
        if self.text_flush_threshold < min_threshold {
            return Err(Error::InvalidConfig(format!(
                "text_flush_threshold ({}) must be at least text_lookahead + {MARKER_LEN} ({})",
                self.text_flush_threshold, min_threshold
            )));
        }
        Ok(())
    }
}

/// Settings for a capture run: serial port, output and framing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Serial port path (`/dev/ttyACM0`, `COM5`, ...).
    pub port: String,

    /// Baud rate (default: 3 686 400).
    pub baud_rate: u32,

    /// Serial read timeout in milliseconds (default: 100).
    pub read_timeout_ms: u64,

    /// Largest single read from the port in bytes (default: 256 KB).
    pub rx_buffer_size: usize,

    /// Sleep between polls when nothing arrived, in milliseconds (default: 1).
    pub idle_sleep_ms: u64,

    /// Directory receiving capture files (default: `acoustic_data`).
    pub output_dir: PathBuf,

    /// Switch the board into waveform-print mode on start (default: true).
    pub arm_device: bool,

    /// Text sent through the feedback menu after arming, if any.
    pub feedback_text: Option<String>,

    /// Framing parameters.
    pub demux: DemuxConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            rx_buffer_size: DEFAULT_RX_BUFFER_SIZE,
            idle_sleep_ms: DEFAULT_IDLE_SLEEP_MS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            arm_device: true,
            feedback_text: Some(DEFAULT_FEEDBACK_TEXT.to_string()),
            demux: DemuxConfig::default(),
        }
    }
}

impl CaptureConfig {
    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON,
    /// or fails [`CaptureConfig::validate`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings for values the capture loop cannot run with.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` on a zero baud rate or read size, or
    /// when the framing parameters are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(Error::InvalidConfig(
                "baud_rate must be greater than 0".to_string(),
            ));
        }
        if self.rx_buffer_size == 0 {
            return Err(Error::InvalidConfig(
                "rx_buffer_size must be greater than 0".to_string(),
            ));
        }
        self.demux.validate()
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn idle_sleep(&self) -> Duration {
        Duration::from_millis(self.idle_sleep_ms)
    }
}
