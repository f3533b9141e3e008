pub mod dsp; // Allocation-free signal primitives
pub mod engine; // Control surface, scheduler thread, renderer
pub mod error;
pub mod graph; // Fixed effects chain
pub mod io;
pub mod params;
pub mod sequencing; // Pattern, arpeggiator, transport
pub mod synth; // Sample voices and the voice pool

pub use engine::{Engine, EngineConfig, Renderer};
pub use error::{ConfigError, DecodeError, Error, ServiceError};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
