//! Real-world scenario benchmarks.
//!
//! These model what actually runs: one scheduling tick on the control
//! side, and one callback's worth of rendering on the audio side.

mod arp;
mod render;

pub use arp::bench_arp;
pub use render::bench_render;
