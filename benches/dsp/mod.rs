//! Benchmarks for low-level DSP primitives.

mod envelope;
mod filter;
mod modulation;

pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use modulation::bench_modulation;
