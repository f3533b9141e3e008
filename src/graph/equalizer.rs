use crate::{
    dsp::{filter::SVFilter, smooth::SmoothedParam},
    graph::{
        node::{GraphNode, RenderCtx},
        CONTROL_BLOCK,
    },
    params::EqSettings,
};

/*
Three-Band Equalizer
====================

  input → low shelf → mid peak → high shelf → output

All three bands sit on the same 350 Hz corner. The shelves tilt everything
below or above it, the peak bends a one-octave bell around it. At 0 dB each
band is an exact passthrough, so the default settings leave the signal
untouched.

Gains glide through a one-pole smoother. Filter coefficients are rebuilt
once per control block from the smoothed gain, never per sample.
*/

/// Corner shared by all three bands.
pub const EQ_CORNER_HZ: f32 = 350.0;
pub const EQ_MID_Q: f32 = 1.0;

pub struct EqNode {
    low: SVFilter,
    mid: SVFilter,
    high: SVFilter,
    low_gain: SmoothedParam,
    mid_gain: SmoothedParam,
    high_gain: SmoothedParam,
}

impl EqNode {
    pub fn new(settings: EqSettings, smoothing_secs: f32, sample_rate: f32) -> Self {
        Self {
            low: SVFilter::low_shelf(EQ_CORNER_HZ, settings.low),
            mid: SVFilter::peak(EQ_CORNER_HZ, EQ_MID_Q, settings.mid),
            high: SVFilter::high_shelf(EQ_CORNER_HZ, settings.high),
            low_gain: SmoothedParam::new(settings.low, smoothing_secs, sample_rate),
            mid_gain: SmoothedParam::new(settings.mid, smoothing_secs, sample_rate),
            high_gain: SmoothedParam::new(settings.high, smoothing_secs, sample_rate),
        }
    }

    pub fn set(&mut self, settings: &EqSettings) {
        self.low_gain.set_target(settings.low);
        self.mid_gain.set_target(settings.mid);
        self.high_gain.set_target(settings.high);
    }

    /// Smoothed gains currently applied (low, mid, high).
    pub fn gains(&self) -> (f32, f32, f32) {
        (
            self.low_gain.value(),
            self.mid_gain.value(),
            self.high_gain.value(),
        )
    }
}

impl GraphNode for EqNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for chunk in out.chunks_mut(CONTROL_BLOCK) {
            let n = chunk.len();
            self.low.set_gain_db(self.low_gain.advance(n));
            self.mid.set_gain_db(self.mid_gain.advance(n));
            self.high.set_gain_db(self.high_gain.advance(n));

            self.low.render(chunk, ctx);
            self.mid.render(chunk, ctx);
            self.high.render(chunk, ctx);
        }
    }

    fn reset(&mut self) {
        self.low.reset();
        self.mid.reset();
        self.high.reset();
    }
}
