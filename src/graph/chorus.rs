use crate::dsp::{delay::DelayLine, lfo::SineLfo, smooth::SmoothedParam};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Chorus Effect
=============

Chorus thickens a sound by mixing the dry signal with a slightly delayed,
pitch-modulated copy. The modulation creates subtle detuning that makes
one voice sound like several playing together.

How It Works
------------

             ┌─────────────────────────────┐
  input ─────┤                             ├──(+)── output
             └── delay(20ms ± depth) ─ ×mix ┘

1. The dry signal always passes through at full level.
2. A copy goes through a short delay centred on 20 ms.
3. A sine LFO sweeps that delay by ± depth milliseconds.
4. The wet copy is scaled by mix and summed onto the dry.

As the delay time moves, the wet copy is pitched up and down a little.
With mix at 0 the output is exactly the dry signal.

Parameters
----------

Rate (0.1 - 10 Hz):   LFO speed. Classic chorus sits around 0.5 - 1.5 Hz.
Depth (0 - 10 ms):    How far the delay swings either side of 20 ms.
Mix (0.0 - 1.0):      Wet level added to the dry signal.
*/

pub const CHORUS_BASE_DELAY_MS: f32 = 20.0;
const CHORUS_MAX_DEPTH_MS: f32 = 10.0;

pub struct ChorusNode {
    delay_line: DelayLine,
    lfo: SineLfo,
    rate: SmoothedParam,
    depth_ms: SmoothedParam,
    mix: SmoothedParam,
}

impl ChorusNode {
    pub fn new(rate: f32, depth_ms: f32, mix: f32, smoothing_secs: f32, sample_rate: f32) -> Self {
        let max_secs = (CHORUS_BASE_DELAY_MS + CHORUS_MAX_DEPTH_MS) / 1000.0;
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
        self.depth_ms.set_target(depth_ms.clamp(0.0, CHORUS_MAX_DEPTH_MS));
        self.mix.set_target(mix);
    }

    pub fn mix(&self) -> f32 {
        self.mix.value()
    }

    pub fn rate(&self) -> f32 {
        self.rate.value()
    }

    pub fn depth_ms(&self) -> f32 {
        self.depth_ms.value()
    }
}

impl GraphNode for ChorusNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let sample_rate = ctx.sample_rate;
        let samples_per_ms = sample_rate / 1000.0;

        for sample in out.iter_mut() {
            let rate = self.rate.next();
            let depth = self.depth_ms.next();
            let mix = self.mix.next();

            let delay_ms = CHORUS_BASE_DELAY_MS + self.lfo.next(rate, sample_rate) * depth;
            let wet = self.delay_line.read_interpolated(delay_ms * samples_per_ms);

            let dry = *sample;
            self.delay_line.write(dry);
            *sample = dry + wet * mix;
        }
    }

    fn reset(&mut self) {
        self.delay_line.reset();
        self.lfo.reset();
    }
}
