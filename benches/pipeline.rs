//! Benchmarks for the spriterig pipeline.

use std::fs;
use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};

use spriterig::compositor::{list_frame_images, GridLayout, MontageRequest};
use spriterig::job::rotation_angles;
use spriterig::{BuiltinTool, CompositeTool, JobPlan, RenderJobConfig};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).unwrap()
}

// -- Planning benchmarks --

fn bench_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("planning");

    let knight = RenderJobConfig::parse(&load_fixture("knight.yaml")).unwrap();

    // Large job: 8 materials x 16 rotations x 4 animations of 60 frames
    let mut large = knight.clone();
    large.material_sets = (0..8)
        .map(|i| {
            let mut set = knight.material_sets[0].clone();
            set.name = format!("material-{}", i);
            set
        })
        .collect();
    large.rotation_count = 16;
    large.animation_sets = (0..4)
        .map(|i| spriterig::AnimationSet::new(format!("anim-{}", i), 0.0, 59.0))
        .collect();

    group.bench_function("plan_knight", |b| {
        b.iter(|| JobPlan::new(black_box(&knight)))
    });

    group.bench_function("plan_large", |b| {
        b.iter(|| JobPlan::new(black_box(&large)))
    });

    group.bench_function("rotation_angles_360", |b| {
        b.iter(|| rotation_angles(black_box(360)))
    });

    group.bench_function("grid_layout_sweep", |b| {
        b.iter(|| {
            (1..4096u32)
                .map(|n| GridLayout::for_frames(black_box(n)).cells())
                .sum::<u32>()
        })
    });

    group.finish();
}

// -- Compositing benchmarks --

fn bench_compositing(c: &mut Criterion) {
    let mut group = c.benchmark_group("compositing");

    let scratch = tempfile::tempdir().unwrap();
    for i in 0..64u32 {
        RgbaImage::from_pixel(32, 32, Rgba([(i * 4) as u8, 64, 128, 255]))
            .save(scratch.path().join(format!("walk_{:02}.png", i)))
            .unwrap();
    }
    let out = tempfile::tempdir().unwrap();
    let output = out.path().join("sheet.png");

    group.bench_function("list_frame_images_64", |b| {
        b.iter(|| list_frame_images(black_box(scratch.path())).unwrap())
    });

    let inputs = list_frame_images(scratch.path()).unwrap();
    let tool = BuiltinTool;

    group.bench_function("builtin_montage_64", |b| {
        b.iter(|| {
            tool.montage(&MontageRequest {
                inputs: black_box(&inputs),
                cell: (32, 32),
                grid: GridLayout::for_frames(64),
                output: &output,
            })
        })
    });

    group.finish();
}

criterion_group!(benches, bench_planning, bench_compositing);
criterion_main!(benches);
