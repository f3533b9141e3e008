//! Benchmarks for the per-tick scheduling decision.
//!
//! One tick must stay far below the 25 ms polling cadence; in practice it
//! should cost well under a microsecond.

use std::hint::black_box;

use criterion::Criterion;
use arpgen::params::Settings;
use arpgen::sequencing::{ArpMode, Arpeggiator, Pattern, Step, Transport};

fn busy_pattern() -> Pattern {
    let mut steps = [Step::default(); 16];
    for (i, step) in steps.iter_mut().enumerate() {
        if i % 3 != 1 {
            *step = Step::on(0.8, (i as i8 * 5) % 12 - 6);
        }
    }
    Pattern::new(steps)
}

pub fn bench_arp(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/arp");
    let pattern = busy_pattern();

    for mode in ArpMode::ALL {
        let mut arp = Arpeggiator::seeded(9);
        let mut tick = 0u64;
        group.bench_function(format!("select/{mode}"), |b| {
            b.iter(|| {
                tick = tick.wrapping_add(1);
                arp.select(black_box(&pattern), mode, black_box(tick))
            })
        });
    }

    let mut settings = Settings::default();
    settings.arp.mode = ArpMode::UpDown;
    let mut transport = Transport::new(Arpeggiator::seeded(9));
    transport.start(0.0);
    let mut now = 0.0;
    group.bench_function("transport_poll", |b| {
        b.iter(|| {
            now += 0.025;
            transport.poll(black_box(now), 0.1, &pattern, &settings, |t| {
                black_box(t);
            })
        })
    });

    group.finish();
}
