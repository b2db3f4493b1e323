//! Capture file format.
//!
//! A capture is a plain text file: a `#`-prefixed header followed by one
//! decimal sample per line.
//!
//! ```text
//! # STM32H723 Acoustic Modem Data
//! # Timestamp: 2025-06-01T14:30:05.123456
//! # Total packets: 2
//! # Total samples: 1024
//! # Format: One 16-bit sample value per line
//! # --------------------------
//! 12
//! -40
//! ...
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use wavetap_core::{Sample, SessionSummary};

use crate::error::{StorageError, StorageResult};

/// First header line.
pub const DEVICE_LINE: &str = "STM32H723 Acoustic Modem Data";

/// Header line describing the body.
pub const FORMAT_LINE: &str = "One 16-bit sample value per line";

const SEPARATOR: &str = "--------------------------";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Write `session` in capture format.
pub fn write_capture<W: Write>(
    out: &mut W,
    session: &SessionSummary,
    timestamp: &NaiveDateTime,
) -> io::Result<()> {
    writeln!(out, "# {DEVICE_LINE}")?;
    writeln!(out, "# Timestamp: {}", timestamp.format(TIMESTAMP_FORMAT))?;
    writeln!(out, "# Total packets: {}", session.frames)?;
    writeln!(out, "# Total samples: {}", session.sample_count())?;
    writeln!(out, "# Format: {FORMAT_LINE}")?;
    writeln!(out, "# {SEPARATOR}")?;

    for sample in &session.samples {
        writeln!(out, "{sample}")?;
    }

    Ok(())
}

/// Contents of a capture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFile {
    /// Timestamp as written in the header.
    pub timestamp: Option<String>,

    /// Packet count from the header.
    pub packets: Option<u64>,

    pub samples: Vec<Sample>,
}

/// Parse a capture from a reader.
///
/// Unknown header lines are ignored. A `Total samples` header that does not
/// match the body is an error.
pub fn parse_capture<R: BufRead>(reader: R) -> StorageResult<CaptureFile> {
    let mut capture = CaptureFile {
        timestamp: None,
        packets: None,
        samples: Vec::new(),
    };
    let mut declared_samples = None;
    let mut last_line = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        last_line = line_no;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('#') {
            let header = header.trim();
            if let Some(value) = header.strip_prefix("Timestamp:") {
                capture.timestamp = Some(value.trim().to_string());
            } else if let Some(value) = header.strip_prefix("Total packets:") {
                capture.packets = Some(parse_count(value, line_no)?);
            } else if let Some(value) = header.strip_prefix("Total samples:") {
                declared_samples = Some(parse_count(value, line_no)?);
            }
            continue;
        }

        let sample = line.parse::<Sample>().map_err(|_| StorageError::Malformed {
            line: line_no,
            message: format!("expected a 16-bit sample, got {line:?}"),
        })?;
        capture.samples.push(sample);
    }

    if let Some(declared) = declared_samples
        && declared != capture.samples.len() as u64
    {
        return Err(StorageError::Malformed {
            line: last_line,
            message: format!(
                "header declares {declared} samples, found {}",
                capture.samples.len()
            ),
        });
    }

    Ok(capture)
}

/// Read a capture file from disk.
pub fn read_capture(path: impl AsRef<Path>) -> StorageResult<CaptureFile> {
    let file = File::open(path)?;
    parse_capture(BufReader::new(file))
}

fn parse_count(value: &str, line: usize) -> StorageResult<u64> {
    value.trim().parse().map_err(|_| StorageError::Malformed {
        line,
        message: format!("expected a count, got {:?}", value.trim()),
    })
}
