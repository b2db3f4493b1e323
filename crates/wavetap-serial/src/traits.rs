//! Collaborator trait definitions.
//!
//! This module defines the seams between the receive loop and the outside
//! world: where bytes come from ([`ByteSource`]), where console text goes
//! ([`TextSink`]) and where decoded samples go ([`SampleSink`]). Real
//! hardware, scripted mocks and file writers all plug in through these.
//!
//! The loop is synchronous and poll-driven, so the traits are plain blocking
//! methods; run them under `tokio::task::spawn_blocking` from async code.

use bytes::Bytes;
use wavetap_core::{MarkerKind, Sample, SessionSummary};

use crate::error::Result;

/// A source of received bytes.
///
/// # Contract
///
/// - `poll` returns whatever arrived since the last call, in order.
/// - An empty buffer means nothing arrived within the read timeout; it is
///   not an error.
/// - `Err(TransportError::SourceClosed)` means the stream has ended.
///
/// # Examples
///
/// ```
/// use wavetap_serial::mock::MockByteSource;
/// use wavetap_serial::traits::ByteSource;
///
/// let mut source = MockByteSource::new([&b"hello\n"[..]]);
/// assert_eq!(&source.poll().unwrap()[..], b"hello\n");
/// assert!(source.poll().unwrap_err().is_source_closed());
/// ```
///
/// [`TransportError::SourceClosed`]: crate::error::TransportError::SourceClosed
pub trait ByteSource: Send {
    /// Return the bytes received since the previous poll.
    fn poll(&mut self) -> Result<Bytes>;
}

/// Receiver of console text.
///
/// Called once per text span, in stream order. Spans are not lines: a long
/// line may arrive in pieces, and a span can end without a newline.
pub trait TextSink {
    fn on_text(&mut self, text: &str);
}

/// Receiver of decoded samples.
pub trait SampleSink {
    /// Accept a completed session.
    ///
    /// Called once per terminal frame, even when the frames of the session
    /// decoded to no samples, and once more at shutdown if samples are
    /// pending. The shutdown flush is skipped when nothing is pending.
    ///
    /// # Errors
    ///
    /// A failing sink is reported and skipped; the receive loop keeps
    /// running.
    fn on_session_flush(&mut self, session: &SessionSummary) -> Result<()>;

    /// Observe one decoded frame. Defaults to doing nothing.
    fn on_frame(&mut self, _kind: MarkerKind, _samples: &[Sample]) {}
}

impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    fn poll(&mut self) -> Result<Bytes> {
        (**self).poll()
    }
}

impl<T: TextSink + ?Sized> TextSink for &mut T {
    fn on_text(&mut self, text: &str) {
        (**self).on_text(text);
    }
}

impl<T: SampleSink + ?Sized> SampleSink for &mut T {
    fn on_session_flush(&mut self, session: &SessionSummary) -> Result<()> {
        (**self).on_session_flush(session)
    }

    fn on_frame(&mut self, kind: MarkerKind, samples: &[Sample]) {
        (**self).on_frame(kind, samples);
    }
}

impl<T: SampleSink + ?Sized> SampleSink for Box<T> {
    fn on_session_flush(&mut self, session: &SessionSummary) -> Result<()> {
        (**self).on_session_flush(session)
    }

    fn on_frame(&mut self, kind: MarkerKind, samples: &[Sample]) {
        (**self).on_frame(kind, samples);
    }
}
