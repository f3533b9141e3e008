use crate::dsp::smooth::SmoothedParam;
use crate::graph::node::{GraphNode, RenderCtx};

/// Master volume with a smoothed linear gain.
pub struct GainNode {
    gain: SmoothedParam,
}

impl GainNode {
    pub fn new(gain: f32, smoothing_secs: f32, sample_rate: f32) -> Self {
        Self {
            gain: SmoothedParam::new(gain, smoothing_secs, sample_rate),
        }
    }

    pub fn set(&mut self, gain: f32) {
        self.gain.set_target(gain);
    }

    pub fn gain(&self) -> f32 {
        self.gain.value()
    }
}

impl GraphNode for GainNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample *= self.gain.next();
        }
    }
}
