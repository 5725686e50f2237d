use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use glam::Vec3;
use isle_bloom::renderer::postprocess::blur::{BlurAxis, BlurSchedule};
use isle_bloom::renderer::postprocess::software::{
    blur_pass, process_frame, run_blur, split_bright, HdrImage,
};
use isle_bloom::renderer::postprocess::tone_map::{
    ToneMapParams, DEFAULT_BLOOM_THRESHOLD,
};

fn test_scene(width: u32, height: u32) -> HdrImage {
    HdrImage::from_fn(width, height, |x, y| {
        if (x / 16 + y / 16) % 5 == 0 {
            Vec3::splat(30.0)
        } else {
            Vec3::new(x as f32 / width as f32, y as f32 / height as f32, 0.2)
        }
    })
}

fn blur_pass_benchmark(c: &mut Criterion) {
    let bright = split_bright(&test_scene(256, 256), DEFAULT_BLOOM_THRESHOLD);
    c.bench_function("blur_pass_256", |b| {
        b.iter(|| {
            black_box(blur_pass(black_box(&bright), BlurAxis::Horizontal))
        })
    });
}

fn blur_schedule_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_blur");
    let bright = split_bright(&test_scene(128, 128), DEFAULT_BLOOM_THRESHOLD);

    for iterations in [2, 6, 10] {
        let _ = group.bench_function(format!("{iterations}_passes"), |b| {
            let schedule = BlurSchedule::new(iterations);
            b.iter(|| black_box(run_blur(&bright, schedule)))
        });
    }
    group.finish();
}

fn full_frame_benchmark(c: &mut Criterion) {
    let scene = test_scene(160, 120);
    let params = ToneMapParams::default();
    c.bench_function("process_frame_160x120", |b| {
        b.iter(|| {
            black_box(process_frame(
                black_box(&scene),
                DEFAULT_BLOOM_THRESHOLD,
                BlurSchedule::default(),
                &params,
            ))
        })
    });
}

criterion_group!(
    benches,
    blur_pass_benchmark,
    blur_schedule_benchmark,
    full_frame_benchmark
);
criterion_main!(benches);
