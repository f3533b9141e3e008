//! External inputs: decoding user-supplied audio into a playable buffer.

pub mod decode;

pub use decode::{decode_sample, SampleBuffer};
