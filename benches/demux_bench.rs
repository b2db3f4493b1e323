//! Performance benchmarks for the stream demultiplexer.
//!
//! At 3.6864 Mbaud the board delivers roughly 360 KB/s, so the demultiplexer
//! needs to sustain several hundred frames per second with console text
//! mixed in. These benchmarks measure throughput for pure frame dumps, text
//! heavy streams, and different read sizes.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench demux_bench
//! ```

use bytes::BytesMut;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tokio_util::codec::{Decoder, Encoder};
use wavetap_core::{MarkerKind, Sample};
use wavetap_protocol::{Demultiplexer, Frame, WaveCodec};

/// Build one waveform dump: `frames - 1` DATA frames and a TERM frame.
fn create_capture(frames: usize) -> Vec<u8> {
    let samples: Vec<Sample> = (0..512).map(|i| (i * 37 % 4096) as Sample).collect();
    let mut stream = Vec::new();
    for i in 0..frames {
        let kind = if i + 1 == frames {
            MarkerKind::Terminal
        } else {
            MarkerKind::Data
        };
        stream.extend_from_slice(&Frame::from_samples(kind, &samples).to_wire());
    }
    stream
}

/// Build a stream of console lines with a few marker words.
fn create_console_text(lines: usize) -> Vec<u8> {
    let mut stream = Vec::new();
    for i in 0..lines {
        if i % 10 == 0 {
            stream.extend_from_slice(b"[mess] DATA path idle, TERM pending\r\n");
        } else {
            stream.extend_from_slice(format!("[adc] sample block {i} ok\r\n").as_bytes());
        }
    }
    stream
}

/// Benchmark feeding a complete capture in one call.
fn bench_feed_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed_capture");

    for frames in [1usize, 10, 100].iter() {
        let stream = create_capture(*frames);
        group.throughput(Throughput::Bytes(stream.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(frames), frames, |b, _| {
            b.iter(|| {
                let mut demux = Demultiplexer::new();
                demux.feed(black_box(&stream));
                black_box(demux.drain_events().count());
            });
        });
    }

    group.finish();
}

/// Benchmark the effect of read size on a capture with text around it.
fn bench_read_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_sizes");

    let mut stream = create_console_text(20);
    stream.extend(create_capture(20));
    stream.extend(create_console_text(20));
    group.throughput(Throughput::Bytes(stream.len() as u64));

    for read_size in [64usize, 512, 4096].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(read_size),
            read_size,
            |b, &size| {
                b.iter(|| {
                    let mut demux = Demultiplexer::new();
                    for chunk in stream.chunks(size) {
                        demux.feed(black_box(chunk));
                        black_box(demux.drain_events().count());
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark text-only streams with stray marker words.
fn bench_console_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("console_text");

    let stream = create_console_text(200);
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("console_200_lines", |b| {
        b.iter(|| {
            let mut demux = Demultiplexer::new();
            demux.feed(black_box(&stream));
            black_box(demux.drain_events().count());
        });
    });

    group.finish();
}

/// Benchmark one large read of console text, as after a long menu dump.
///
/// Each line must cost the same however much text is still buffered behind
/// it, so throughput should stay flat as the burst grows.
fn bench_console_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("console_burst");
    group.sample_size(20);

    for lines in [1_000usize, 8_000].iter() {
        let stream = create_console_text(*lines);
        group.throughput(Throughput::Bytes(stream.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(lines), &stream, |b, stream| {
            b.iter(|| {
                let mut demux = Demultiplexer::new();
                demux.feed(black_box(stream));
                black_box(demux.drain_events().count());
            });
        });
    }

    group.finish();
}

/// Benchmark encoding and decoding through the codec.
fn bench_codec_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_roundtrip");
    group.throughput(Throughput::Elements(1));

    let frame = Frame::from_samples(MarkerKind::Terminal, &[0x55; 512]);

    group.bench_function("roundtrip_default_frame", |b| {
        b.iter(|| {
            let mut encoder = WaveCodec::new();
            let mut decoder = WaveCodec::new();
            let mut buffer = BytesMut::new();

            encoder.encode(black_box(frame.clone()), &mut buffer).unwrap();

            while let Some(event) = decoder.decode(&mut buffer).unwrap() {
                black_box(event);
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_feed_capture,
    bench_read_sizes,
    bench_console_text,
    bench_console_burst,
    bench_codec_roundtrip,
);

criterion_main!(benches);
