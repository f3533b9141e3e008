//! Benchmarks for breakpoint envelope generation and evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use arpgen::dsp::envelope::{Adsr, EnvelopeCurve};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let adsr = Adsr::new(0.01, 0.1, 0.8, 0.2);

    group.bench_function("generate", |b| {
        b.iter(|| EnvelopeCurve::generate(black_box(&adsr), black_box(1.0), 0.8, black_box(0.09)))
    });

    let env = EnvelopeCurve::generate(&adsr, 0.0, 0.8, 0.09);
    let period = 1.0 / 48_000.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        // Straddle the gate so every segment kind is evaluated
        let start = 0.08;
        group.bench_with_input(BenchmarkId::new("value_at", size), &size, |b, _| {
            b.iter(|| {
                for (i, out) in buffer.iter_mut().enumerate() {
                    *out = env.value_at(black_box(start + i as f64 * period));
                }
            })
        });
    }

    group.finish();
}
