//! Serial port byte source.
//!
//! Reads the board's USB CDC serial port with the `serialport` crate. Each
//! poll takes whatever the driver has buffered, up to the configured read
//! size, and returns immediately with an empty buffer when nothing is
//! waiting. The same port carries console commands in the other direction,
//! so the source also implements [`std::io::Write`].

use std::io::{self, Read, Write};

use bytes::Bytes;
use serialport::{ClearBuffer, SerialPort};
use tracing::{debug, info, trace};
use wavetap_core::CaptureConfig;

use crate::error::{Result, TransportError};
use crate::traits::ByteSource;

/// Byte source backed by a serial port.
pub struct SerialByteSource {
    port: Box<dyn SerialPort>,

    /// Scratch buffer; its length caps a single read.
    read_buf: Vec<u8>,
}

impl SerialByteSource {
    /// Open the port named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Open` if the device cannot be opened.
    pub fn open(config: &CaptureConfig) -> Result<Self> {
        info!(
            "Opening serial port {} at {} baud",
            config.port, config.baud_rate
        );

        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(config.read_timeout())
            .open()
            .map_err(|e| TransportError::open(&config.port, e.to_string()))?;

        Ok(Self::from_port(port, config.rx_buffer_size))
    }

    /// Wrap an already opened port.
    ///
    /// `max_read` bounds the bytes taken per poll; it is raised to at least 1.
    pub fn from_port(port: Box<dyn SerialPort>, max_read: usize) -> Self {
        Self {
            port,
            read_buf: vec![0; max_read.max(1)],
        }
    }

    /// Port name as reported by the driver.
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }

    /// Drop anything the driver has buffered but not yet delivered.
    pub fn discard_input(&mut self) -> Result<()> {
        self.port.clear(ClearBuffer::Input)?;
        debug!("Discarded pending serial input");
        Ok(())
    }
}

impl ByteSource for SerialByteSource {
    fn poll(&mut self) -> Result<Bytes> {
        let waiting = self.port.bytes_to_read()? as usize;
        if waiting == 0 {
            return Ok(Bytes::new());
        }

        let len = waiting.min(self.read_buf.len());
        match self.port.read(&mut self.read_buf[..len]) {
            Ok(0) => Err(TransportError::SourceClosed),
            Ok(n) => {
                trace!("Read {} bytes ({} waiting)", n, waiting);
                Ok(Bytes::copy_from_slice(&self.read_buf[..n]))
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(Bytes::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Write for SerialByteSource {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl std::fmt::Debug for SerialByteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialByteSource")
            .field("port", &self.port.name())
            .field("max_read", &self.read_buf.len())
            .finish()
    }
}
