//! Benchmarks for the full render path: voice pool plus effects chain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use arpgen::{params::Settings, Engine, EngineConfig};

use crate::BLOCK_SIZES;

fn wav_bytes() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 48_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav header");
        for i in 0..48_000 {
            let s = ((i as f32 * 0.03).sin() * 20_000.0) as i16;
            writer.write_sample(s).expect("wav sample");
        }
        writer.finalize().expect("wav finalize");
    }
    cursor.into_inner()
}

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");

    for &size in BLOCK_SIZES {
        // Effects only, no voices
        let (_engine, mut renderer) = Engine::offline(&EngineConfig::default());
        let mut buffer = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("idle_chain", size), &size, |b, _| {
            b.iter(|| renderer.render(black_box(&mut buffer)))
        });

        // Every effect engaged, transport running
        let (mut engine, mut renderer) = Engine::offline(&EngineConfig::default());
        engine.load_sample(&wav_bytes()).expect("demo sample");
        let mut settings = Settings::default();
        settings.bpm = 300.0;
        settings.modulation.chorus_mix = 0.5;
        settings.modulation.flanger_mix = 0.5;
        settings.eq.low = 6.0;
        settings.filter.lp_freq = 3_000.0;
        engine.set_settings(settings);
        engine.set_pattern(arpgen::sequencing::Pattern::new(
            [arpgen::sequencing::Step::on(0.8, 0); 16],
        ));
        engine.start().expect("scheduler");
        let mut buffer = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("playing", size), &size, |b, _| {
            b.iter(|| renderer.render(black_box(&mut buffer)))
        });
        engine.stop();
    }

    group.finish();
}
