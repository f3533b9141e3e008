use std::sync::Arc;

use arc_swap::ArcSwapOption;
use rtrb::Consumer;

use crate::{
    io::decode::SampleBuffer,
    synth::{message::VoiceTrigger, voice::SampleVoice},
};

/// Shared slot holding the currently loaded sample, if any.
pub type SampleSlot = Arc<ArcSwapOption<SampleBuffer>>;

/// Fixed pool of sample voices fed by the scheduler's trigger queue.
///
/// Lives on the audio thread. Voices are preallocated; a full pool steals
/// the voice with the earliest start.
pub struct VoicePool {
    voices: Vec<SampleVoice>,
    rx: Consumer<VoiceTrigger>,
    sample: SampleSlot,
    sample_rate: f32,
}

impl VoicePool {
    pub fn new(
        max_voices: usize,
        rx: Consumer<VoiceTrigger>,
        sample: SampleSlot,
        sample_rate: f32,
    ) -> Self {
        Self {
            voices: (0..max_voices.max(1)).map(|_| SampleVoice::new()).collect(),
            rx,
            sample,
            sample_rate,
        }
    }

    /// Mix every voice into `out` (which is overwritten). `block_start` is
    /// the output frame of `out[0]`.
    pub fn render_block(&mut self, out: &mut [f32], block_start: u64) {
        self.drain_triggers();

        out.fill(0.0);
        for voice in self.voices.iter_mut().filter(|v| !v.is_free()) {
            voice.render(out, block_start, self.sample_rate);
        }
    }

    fn drain_triggers(&mut self) {
        if self.rx.is_empty() {
            return;
        }
        // No sample loaded: triggers are consumed and dropped.
        let buffer = self.sample.load_full();

        while let Ok(trigger) = self.rx.pop() {
            let Some(buffer) = buffer.as_ref() else {
                continue;
            };
            let sample_rate = self.sample_rate;
            self.allocate_voice()
                .start(trigger, Arc::clone(buffer), sample_rate);
        }
    }

    fn allocate_voice(&mut self) -> &mut SampleVoice {
        let idx = self
            .voices
            .iter()
            .position(|v| v.is_free())
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.start_frame())
                    .map(|(idx, _)| idx)
            })
            .unwrap_or(0);

        &mut self.voices[idx]
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_free()).count()
    }

    pub fn capacity(&self) -> usize {
        self.voices.len()
    }
}
