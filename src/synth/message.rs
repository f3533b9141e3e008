use crate::dsp::envelope::EnvelopeCurve;

/// Seconds a voice keeps running after its release reaches the floor.
pub const VOICE_TAIL: f64 = 0.1;

/// One scheduled note, sent from the scheduler thread to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceTrigger {
    /// Start time on the audio clock (seconds).
    pub time: f64,
    /// Grid index the note came from.
    pub step: usize,
    pub velocity: f32,
    /// Semitones; applied as playback rate.
    pub pitch: i8,
    pub envelope: EnvelopeCurve,
}

impl VoiceTrigger {
    /// When the voice is removed from the pool.
    pub fn stop_time(&self) -> f64 {
        self.envelope.end() + VOICE_TAIL
    }

    pub fn playback_rate(&self) -> f64 {
        2f64.powf(self.pitch as f64 / 12.0)
    }
}
