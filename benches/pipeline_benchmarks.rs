//! Benchmarks for the in-process parts of the ffpipe pipeline
//!
//! Run with: cargo bench
//!
//! The encoder itself is an external process, so these cover what runs
//! per frame or per session on our side of the pipe.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ffpipe::recording::{
    encode_args, estimate_bitrate, seconds_to_timecode, Dimensions, SubtitleTrack, VideoCodec,
};
use ffpipe::testing::synthetic_video_frame;
use std::path::Path;

fn bench_frame_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Synthetic Frames");

    let resolutions = [
        (640, 480, "480p"),
        (1280, 720, "720p"),
        (1920, 1080, "1080p"),
    ];

    for (width, height, name) in resolutions {
        let dims = Dimensions::new(width, height);
        group.throughput(Throughput::Bytes(dims.frame_len() as u64));
        group.bench_with_input(BenchmarkId::new("bgr24", name), &dims, |b, &dims| {
            let mut n = 0u64;
            b.iter(|| {
                n += 1;
                black_box(synthetic_video_frame(n, dims))
            });
        });
    }

    group.finish();
}

fn bench_bitrate(c: &mut Criterion) {
    c.bench_function("estimate_bitrate 1080p60", |b| {
        let dims = Dimensions::new(1920, 1080);
        b.iter(|| estimate_bitrate(black_box(dims), black_box(60.0)));
    });
}

fn bench_command_building(c: &mut Criterion) {
    c.bench_function("encode_args", |b| {
        let dims = Dimensions::new(1280, 720);
        b.iter(|| {
            encode_args(
                black_box(dims),
                30.0,
                VideoCodec::Libx264,
                3.333,
                Path::new("out.mp4"),
            )
        });
    });
}

fn bench_subtitles(c: &mut Criterion) {
    let mut group = c.benchmark_group("Subtitles");

    group.bench_function("seconds_to_timecode", |b| {
        b.iter(|| seconds_to_timecode(black_box(3661.4567)));
    });

    for count in [100usize, 1_000, 10_000] {
        let mut track = SubtitleTrack::new();
        for i in 0..count {
            let _ = track.add_entry(format!("t={}", i), 30.0);
        }
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("to_srt", count), &track, |b, track| {
            b.iter(|| track.to_srt());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_frame_generation,
    bench_bitrate,
    bench_command_building,
    bench_subtitles
);
criterion_main!(benches);
