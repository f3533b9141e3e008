//! Benchmarks for state-variable filter responses.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use arpgen::dsp::filter::SVFilter;
use arpgen::graph::node::RenderCtx;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::new(48_000.0);

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let filters = [
            ("lowpass", SVFilter::lowpass(1000.0)),
            ("highpass", SVFilter::highpass(1000.0)),
            ("low_shelf", SVFilter::low_shelf(350.0, 6.0)),
            ("peak", SVFilter::peak(350.0, 1.0, -6.0)),
            ("high_shelf", SVFilter::high_shelf(350.0, 6.0)),
        ];

        for (name, mut filter) in filters {
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
