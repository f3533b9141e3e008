//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free once constructed and realtime-safe.
//! They stay focused on the signal-processing math; parameter smoothing and
//! block orchestration live in the graph nodes.

/// Fractional delay line for the chorus and flanger.
pub mod delay;
/// Breakpoint ADSR envelope for scheduled notes.
pub mod envelope;
/// State-variable filter with pass, shelf and peak responses.
pub mod filter;
/// Sine LFO for delay-time modulation.
pub mod lfo;
/// One-pole parameter smoothing.
pub mod smooth;

pub use envelope::{Adsr, EnvelopeCurve};
