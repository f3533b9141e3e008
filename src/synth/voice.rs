use std::sync::Arc;

use crate::{io::decode::SampleBuffer, synth::message::VoiceTrigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,    // Available for allocation
    Pending, // Trigger received, start time not reached yet
    Playing, // Reading the sample under its envelope
}

/// One triggered note: the shared sample played at a fixed rate under a
/// precomputed envelope.
pub struct SampleVoice {
    state: VoiceState,
    trigger: Option<VoiceTrigger>,
    buffer: Option<Arc<SampleBuffer>>,
    /// Read position in source frames.
    position: f64,
    /// Source frames advanced per output frame.
    rate: f64,
    start_frame: u64,
    stop_frame: u64,
}

impl SampleVoice {
    pub fn new() -> Self {
        Self {
            state: VoiceState::Free,
            trigger: None,
            buffer: None,
            position: 0.0,
            rate: 1.0,
            start_frame: 0,
            stop_frame: 0,
        }
    }

    pub fn start(&mut self, trigger: VoiceTrigger, buffer: Arc<SampleBuffer>, sample_rate: f32) {
        let sr = sample_rate as f64;
        self.rate = trigger.playback_rate() * buffer.sample_rate() as f64 / sr;
        self.start_frame = (trigger.time * sr).round().max(0.0) as u64;
        self.stop_frame = (trigger.stop_time() * sr).round().max(0.0) as u64;
        self.position = 0.0;
        self.buffer = Some(buffer);
        self.trigger = Some(trigger);
        self.state = VoiceState::Pending;
    }

    /// Add this voice into `out`, whose first sample is output frame
    /// `block_start`.
    pub fn render(&mut self, out: &mut [f32], block_start: u64, sample_rate: f32) {
        let (Some(trigger), Some(buffer)) = (self.trigger.as_ref(), self.buffer.as_ref()) else {
            return;
        };
        let period = 1.0 / sample_rate as f64;
        let frames = buffer.frames() as f64;
        let mut finished = false;

        for (i, sample) in out.iter_mut().enumerate() {
            let frame = block_start + i as u64;
            if frame < self.start_frame {
                continue;
            }
            if frame >= self.stop_frame || self.position >= frames {
                finished = true;
                break;
            }
            self.state = VoiceState::Playing;

            let gain = trigger.envelope.value_at(frame as f64 * period);
            *sample += buffer.read_interpolated(self.position) * gain;
            self.position += self.rate;
        }

        if finished {
            self.free();
        }
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.trigger = None;
        self.buffer = None;
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    /// Scheduled start, used to pick the oldest voice to steal.
    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }
}

impl Default for SampleVoice {
    fn default() -> Self {
        Self::new()
    }
}
