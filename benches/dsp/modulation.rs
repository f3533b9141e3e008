//! Benchmarks for the modulated-delay effects.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use arpgen::graph::{
    chorus::ChorusNode,
    flanger::FlangerNode,
    node::{GraphNode, RenderCtx},
};

use crate::BLOCK_SIZES;

pub fn bench_modulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/modulation");
    let ctx = RenderCtx::new(48_000.0);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();

        let mut chorus = ChorusNode::new(1.5, 4.0, 0.5, 0.05, 48_000.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("chorus", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                chorus.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        let mut flanger = FlangerNode::new(0.5, 2.0, 0.7, 0.05, 48_000.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("flanger", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                flanger.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
