use crate::dsp::{delay::DelayLine, lfo::SineLfo, smooth::SmoothedParam};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Flanger Effect
==============

A flanger is a chorus with a much shorter delay and feedback. The short
delay puts a comb filter on the signal; sweeping it moves the notches up
and down the spectrum for the familiar jet-plane swoosh.

             ┌────────────────────────────────────┐
  input ──┬──┤                                    ├──(+)── output
          │  └── (+) → delay(2ms ± depth/2) ┬ ×mix ┘
          │       ↑                         │
          └───────┘        ×feedback ───────┘

Feedback is tied to the mix knob (0.7 × mix), so a dry flanger also has
no resonance, and a fully wet one rings hard but stays below unity loop
gain.
*/

pub const FLANGER_BASE_DELAY_MS: f32 = 2.0;
pub const FLANGER_FEEDBACK_SCALE: f32 = 0.7;
const FLANGER_MAX_DEPTH_MS: f32 = 5.0;

pub struct FlangerNode {
    delay_line: DelayLine,
    lfo: SineLfo,
    rate: SmoothedParam,
    depth_ms: SmoothedParam,
    mix: SmoothedParam,
}

impl FlangerNode {
    pub fn new(rate: f32, depth_ms: f32, mix: f32, smoothing_secs: f32, sample_rate: f32) -> Self {
        let max_secs = (FLANGER_BASE_DELAY_MS + FLANGER_MAX_DEPTH_MS / 2.0) / 1000.0;
        Self {
            delay_line: DelayLine::with_max_seconds(max_secs, sample_rate),
            lfo: SineLfo::new(),
            rate: SmoothedParam::new(rate, smoothing_secs, sample_rate),
            depth_ms: SmoothedParam::new(depth_ms, smoothing_secs, sample_rate),
            mix: SmoothedParam::new(mix, smoothing_secs, sample_rate),
        }
    }

    pub fn set(&mut self, rate: f32, depth_ms: f32, mix: f32) {
        self.rate.set_target(rate);
        self.depth_ms.set_target(depth_ms.clamp(0.0, FLANGER_MAX_DEPTH_MS));
        self.mix.set_target(mix);
    }

    pub fn mix(&self) -> f32 {
        self.mix.value()
    }

    pub fn feedback(&self) -> f32 {
        self.mix.value() * FLANGER_FEEDBACK_SCALE
    }
}

impl GraphNode for FlangerNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let sample_rate = ctx.sample_rate;
        let samples_per_ms = sample_rate / 1000.0;

        for sample in out.iter_mut() {
            let rate = self.rate.next();
            let depth = self.depth_ms.next() * 0.5;
            let mix = self.mix.next();

            let delay_ms = FLANGER_BASE_DELAY_MS + self.lfo.next(rate, sample_rate) * depth;
            let wet = self.delay_line.read_interpolated(delay_ms * samples_per_ms);

            let dry = *sample;
            self.delay_line.write(dry + wet * mix * FLANGER_FEEDBACK_SCALE);
            *sample = dry + wet * mix;
        }
    }

    fn reset(&mut self) {
        self.delay_line.reset();
        self.lfo.reset();
    }
}
