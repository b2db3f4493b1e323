//! Tokio codec for the waveform print stream.
//!
//! `WaveCodec` wraps a [`Demultiplexer`] so any `AsyncRead` carrying the
//! board's output can be consumed as a stream of [`DemuxEvent`]s through
//! `FramedRead`. It also implements [`Encoder<Frame>`], which is what test
//! rigs and replay tools use to produce the board's framing.
//!
//! # Architecture
//!
//! ```text
//! AsyncRead -> Decoder -> DemuxEvent (text, frame, session flush)
//! Frame -> Encoder -> marker || payload || AA BB CC DD
//! ```
//!
//! # Usage with Tokio FramedRead
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use tokio_util::codec::FramedRead;
//! use wavetap_protocol::{DemuxEvent, WaveCodec};
//!
//! # async fn example() -> wavetap_core::Result<()> {
//! let capture = tokio::fs::File::open("capture.bin").await?;
//! let mut events = FramedRead::new(capture, WaveCodec::new());
//!
//! while let Some(event) = events.next().await {
//!     if let DemuxEvent::SessionFlushed(session) = event? {
//!         println!("session with {} samples", session.sample_count());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # End of Stream
//!
//! At EOF the codec flushes a pending session as a final
//! [`DemuxEvent::SessionFlushed`] and silently drops any partial frame,
//! instead of failing with "bytes remaining on stream".

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::{DemuxEvent, Demultiplexer, Frame};
use wavetap_core::{DemuxConfig, Error, Result};

/// Tokio codec for the waveform print stream.
#[derive(Debug, Default)]
pub struct WaveCodec {
    /// Demultiplexer holding partial units between reads.
    demux: Demultiplexer,
}

impl WaveCodec {
    /// Create a codec with the default framing (1024-byte payloads).
    pub fn new() -> Self {
        Self {
            demux: Demultiplexer::new(),
        }
    }

    /// Create a codec with custom framing parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `config` is invalid.
    pub fn with_config(config: DemuxConfig) -> Result<Self> {
        Ok(Self {
            demux: Demultiplexer::with_config(config)?,
        })
    }

    /// Access the wrapped demultiplexer (stats, pending samples).
    pub fn demux(&self) -> &Demultiplexer {
        &self.demux
    }

    /// Payload size used by both directions.
    pub fn payload_size(&self) -> usize {
        self.demux.config().payload_size
    }
}

impl Decoder for WaveCodec {
    type Item = DemuxEvent;
    type Error = Error;

    /// Feed new bytes to the demultiplexer and return the next event.
    ///
    /// All of `src` is moved into the demultiplexer's own buffer, so `src`
    /// is always left empty.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use tokio_util::codec::Decoder;
    /// use wavetap_protocol::{DemuxEvent, WaveCodec};
    ///
    /// let mut codec = WaveCodec::new();
    /// let mut buffer = BytesMut::from(&b"Menu:\r\n"[..]);
    ///
    /// let event = codec.decode(&mut buffer).unwrap();
    /// assert_eq!(event, Some(DemuxEvent::Text("Menu:\r\n".to_string())));
    /// ```
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if !src.is_empty() {
            self.demux.feed(src);
            src.clear();
        }

        Ok(self.demux.next_event())
    }

    /// Return remaining events, then the pending session, then `None`.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(event) = self.decode(src)? {
            return Ok(Some(event));
        }

        Ok(self.demux.finish().map(DemuxEvent::SessionFlushed))
    }
}

impl Encoder<Frame> for WaveCodec {
    type Error = Error;

    /// Write a frame in wire format.
    ///
    /// # Errors
    ///
    /// Returns `Error::PayloadSizeMismatch` if the payload length differs
    /// from the configured payload size; such a frame would never be
    /// recognised by a receiver with the same configuration.
    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        let expected = self.payload_size();
        if item.payload().len() != expected {
            return Err(Error::PayloadSizeMismatch {
                expected,
                actual: item.payload().len(),
            });
        }

        item.encode(dst);
        Ok(())
    }
}
