use crate::{
    dsp::{filter::SVFilter, smooth::SmoothedParam},
    graph::{
        node::{GraphNode, RenderCtx},
        CONTROL_BLOCK,
    },
    params::FilterSettings,
};

/*
Band-Limiting Filter Pair
=========================

  input → lowpass (cutoff, Q) → highpass (cutoff, Q = 1) → output

The low-pass darkens the sample as its cutoff comes down; the high-pass
thins it out as its cutoff goes up. With the defaults (15 kHz / 20 Hz) the
pair is close to transparent.

Resonance is a low-pass control only. The high-pass keeps a fixed Q of 1.

Cutoff (Hz):
  20 Hz:     Barely open (very dark)
  1000 Hz:   Warm, round
  15000 Hz:  Open

Q:
  0.1 - 0.7: Gentle rolloff
  1.0 - 4.0: Audible peak at the cutoff
  10+:       Sharp, ringing
*/

pub const HIGHPASS_Q: f32 = 1.0;

pub struct FilterNode {
    lowpass: SVFilter,
    highpass: SVFilter,
    lp_freq: SmoothedParam,
    hp_freq: SmoothedParam,
    q: SmoothedParam,
}

impl FilterNode {
    pub fn new(settings: FilterSettings, smoothing_secs: f32, sample_rate: f32) -> Self {
        let mut lowpass = SVFilter::lowpass(settings.lp_freq);
        lowpass.set_q(settings.q);
        let mut highpass = SVFilter::highpass(settings.hp_freq);
        highpass.set_q(HIGHPASS_Q);

        Self {
            lowpass,
            highpass,
            lp_freq: SmoothedParam::new(settings.lp_freq, smoothing_secs, sample_rate),
            hp_freq: SmoothedParam::new(settings.hp_freq, smoothing_secs, sample_rate),
            q: SmoothedParam::new(settings.q, smoothing_secs, sample_rate),
        }
    }

    pub fn set(&mut self, settings: &FilterSettings) {
        self.lp_freq.set_target(settings.lp_freq);
        self.hp_freq.set_target(settings.hp_freq);
        self.q.set_target(settings.q);
    }

    /// Smoothed low-pass cutoff currently applied.
    pub fn lowpass_cutoff(&self) -> f32 {
        self.lp_freq.value()
    }

    pub fn highpass_cutoff(&self) -> f32 {
        self.hp_freq.value()
    }

    pub fn resonance(&self) -> f32 {
        self.q.value()
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for chunk in out.chunks_mut(CONTROL_BLOCK) {
            let n = chunk.len();
            self.lowpass.set_cutoff(self.lp_freq.advance(n));
            self.lowpass.set_q(self.q.advance(n));
            self.highpass.set_cutoff(self.hp_freq.advance(n));

            self.lowpass.render(chunk, ctx);
            self.highpass.render(chunk, ctx);
        }
    }

    fn reset(&mut self) {
        self.lowpass.reset();
        self.highpass.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    const SR: f32 = 48_000.0;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len).map(|i| (TAU * freq * i as f32 / SR).sin()).collect()
    }

    fn tail_peak(buffer: &[f32]) -> f32 {
        buffer[buffer.len() / 2..]
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn cutoff_converges_after_smoothing() {
        let mut node = FilterNode::new(FilterSettings::default(), 0.05, SR);
        node.set(&FilterSettings {
            lp_freq: 500.0,
            ..FilterSettings::default()
        });

        // Five time constants
        let mut buffer = vec![0.0; (SR * 0.25) as usize];
        node.render_block(&mut buffer, &RenderCtx::new(SR));

        let cutoff = node.lowpass_cutoff();
        assert!(
            (cutoff - 500.0).abs() < 15_000.0 * 0.01,
            "cutoff should settle near 500 Hz, got {}",
            cutoff
        );
    }

    #[test]
    fn closing_lowpass_darkens_signal() {
        let ctx = RenderCtx::new(SR);
        let mut open = FilterNode::new(FilterSettings::default(), 0.05, SR);
        let mut closed = FilterNode::new(
            FilterSettings {
                lp_freq: 300.0,
                ..FilterSettings::default()
            },
            0.05,
            SR,
        );

        let mut a = sine(4_000.0, 4096);
        let mut b = a.clone();
        open.render_block(&mut a, &ctx);
        closed.render_block(&mut b, &ctx);

        assert!(tail_peak(&a) > 0.9);
        assert!(tail_peak(&b) < 0.05, "got {}", tail_peak(&b));
    }
}
