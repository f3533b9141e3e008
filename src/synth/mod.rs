//! Sample voices and the pool that mixes them.
//!
//! The scheduler sends [`message::VoiceTrigger`]s through a lock-free queue;
//! [`poly::VoicePool`] turns each one into a [`voice::SampleVoice`] on the
//! audio thread.

pub mod message;
pub mod poly;
pub mod voice;

pub use message::VoiceTrigger;
pub use poly::{SampleSlot, VoicePool};
