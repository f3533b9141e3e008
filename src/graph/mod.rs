//! The fixed master effects chain and its nodes.
//!
//! Nodes wrap the low-level DSP primitives with smoothed parameters and
//! block-based rendering. [`chain::EffectsChain`] wires them in their one
//! permanent order.

/// Passthrough that feeds the spectrum analyzer.
pub mod analyser;
/// The complete EQ → filter → chorus → flanger → gain → tap chain.
pub mod chain;
/// Modulated-delay chorus, dry plus wet.
pub mod chorus;
/// Low shelf, peak and high shelf at a shared corner.
pub mod equalizer;
/// Lowpass followed by highpass.
pub mod filter;
/// Short modulated delay with feedback.
pub mod flanger;
/// Smoothed master volume.
pub mod gain;
/// Core traits shared by all graph nodes.
pub mod node;

/// Samples between filter coefficient updates.
pub const CONTROL_BLOCK: usize = 64;
