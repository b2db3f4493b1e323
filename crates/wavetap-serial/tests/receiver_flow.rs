//! Integration tests for the receive loop.
//!
//! These tests drive a [`Receiver`] the way the capture tool does: from a
//! blocking task under Tokio, stopped by source closure or by cancelling
//! the token from another task.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wavetap_core::{CaptureConfig, DemuxConfig, MarkerKind, Sample};
use wavetap_protocol::Frame;
use wavetap_serial::{
    ConsoleCommand, MockByteSource, ProgressReporter, Receiver, RecordingSink, StopReason,
};

fn capture_config(payload_size: usize) -> CaptureConfig {
    CaptureConfig {
        idle_sleep_ms: 1,
        demux: DemuxConfig::with_payload_size(payload_size),
        ..CaptureConfig::default()
    }
}

fn wire(kind: MarkerKind, samples: &[Sample]) -> Vec<u8> {
    Frame::from_samples(kind, samples).to_wire().to_vec()
}

#[tokio::test]
async fn test_cancel_flushes_pending_session() {
    let source =
        MockByteSource::new([wire(MarkerKind::Data, &[4, 5]), b"tick\n".to_vec()]).stay_open();
    let mut receiver = Receiver::with_config(source, &capture_config(4)).unwrap();
    let cancel = CancellationToken::new();

    let token = cancel.clone();
    let task = tokio::task::spawn_blocking(move || {
        let mut text = RecordingSink::new();
        let mut samples = RecordingSink::new();
        let summary = receiver.run(&mut text, &mut samples, &token).unwrap();
        (summary, text, samples)
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let (summary, text, samples) = task.await.unwrap();
    assert_eq!(summary.stop, StopReason::Cancelled);
    assert_eq!(text.text(), "tick\n");
    assert_eq!(samples.sessions.len(), 1);
    assert_eq!(samples.sessions[0].samples, vec![4, 5]);
}

#[tokio::test]
async fn test_default_framing_capture_with_progress() {
    let samples: Vec<Sample> = (0..512).collect();
    let mut stream = b"Waveform print enabled\r\n".to_vec();
    for _ in 0..11 {
        stream.extend(wire(MarkerKind::Data, &samples));
    }
    stream.extend(wire(MarkerKind::Terminal, &samples));

    let source = MockByteSource::chunked(&stream, 333);
    let mut receiver = Receiver::with_config(source, &CaptureConfig::default()).unwrap();

    let task = tokio::task::spawn_blocking(move || {
        let mut text = RecordingSink::new();
        let mut progress = ProgressReporter::new(RecordingSink::new());
        let summary = receiver
            .run(&mut text, &mut progress, &CancellationToken::new())
            .unwrap();
        (summary, progress.into_inner())
    });

    let (summary, sink) = task.await.unwrap();
    assert_eq!(summary.stop, StopReason::SourceClosed);
    assert_eq!(summary.stats.frames, 12);
    assert_eq!(sink.frames.len(), 12);
    assert_eq!(sink.sessions.len(), 1);
    assert_eq!(sink.sessions[0].sample_count(), 12 * 512);
    assert_eq!(sink.sessions[0].frames, 12);
}

#[test]
fn test_arm_sequence_then_capture() {
    // Commands go out on the write side before the loop starts
    let mut port = Vec::new();
    ConsoleCommand::ToggleWaveformPrint
        .send_with_gap(&mut port, Duration::ZERO)
        .unwrap();
    ConsoleCommand::FeedbackMessage("test".to_string())
        .send_with_gap(&mut port, Duration::ZERO)
        .unwrap();
    assert!(port.ends_with(b"4\r\n4\r\ntest\r\n"));

    let mut stream = b"Feedback sent\r\n".to_vec();
    stream.extend(wire(MarkerKind::Terminal, &[7, -7]));
    let mut receiver =
        Receiver::with_config(MockByteSource::new([stream]), &capture_config(4)).unwrap();

    let mut text = RecordingSink::new();
    let mut samples = RecordingSink::new();
    receiver
        .run(&mut text, &mut samples, &CancellationToken::new())
        .unwrap();

    assert_eq!(text.text(), "Feedback sent\r\n");
    assert_eq!(samples.sessions[0].samples, vec![7, -7]);
}
