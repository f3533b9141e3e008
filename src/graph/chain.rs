use crate::{
    graph::{
        analyser::AnalysisTap,
        chorus::ChorusNode,
        equalizer::EqNode,
        filter::FilterNode,
        flanger::FlangerNode,
        gain::GainNode,
        node::{GraphNode, RenderCtx},
    },
    params::Settings,
};

/*
Master Effects Chain
====================

Every voice is summed into one mono bus, and that bus runs through a fixed
series of nodes:

  voices → EQ (low shelf → peak → high shelf)
         → filter (lowpass → highpass)
         → chorus (dry + wet)
         → flanger (dry + wet, feedback)
         → master gain
         → analysis tap → output

The chain is built once and lives as long as the renderer. Only parameter
targets change at runtime, never the order of nodes.
*/

pub struct EffectsChain {
    eq: EqNode,
    filter: FilterNode,
    chorus: ChorusNode,
    flanger: FlangerNode,
    master: GainNode,
    tap: AnalysisTap,
    ctx: RenderCtx,
}

impl EffectsChain {
    /// Build the chain already settled at `settings`.
    pub fn new(settings: &Settings, smoothing_secs: f32, sample_rate: f32, tap: AnalysisTap) -> Self {
        let m = &settings.modulation;
        Self {
            eq: EqNode::new(settings.eq, smoothing_secs, sample_rate),
            filter: FilterNode::new(settings.filter, smoothing_secs, sample_rate),
            chorus: ChorusNode::new(
                m.chorus_rate,
                m.chorus_depth,
                m.chorus_mix,
                smoothing_secs,
                sample_rate,
            ),
            flanger: FlangerNode::new(
                m.flanger_rate,
                m.flanger_depth,
                m.flanger_mix,
                smoothing_secs,
                sample_rate,
            ),
            master: GainNode::new(settings.volume, smoothing_secs, sample_rate),
            tap,
            ctx: RenderCtx::new(sample_rate),
        }
    }

    /// Retarget every smoothed parameter. Cheap enough to call every block.
    pub fn apply(&mut self, settings: &Settings) {
        let m = &settings.modulation;
        self.eq.set(&settings.eq);
        self.filter.set(&settings.filter);
        self.chorus.set(m.chorus_rate, m.chorus_depth, m.chorus_mix);
        self.flanger
            .set(m.flanger_rate, m.flanger_depth, m.flanger_mix);
        self.master.set(settings.volume);
    }

    pub fn process(&mut self, out: &mut [f32]) {
        let ctx = self.ctx;
        self.render_block(out, &ctx);
    }

    pub fn eq(&self) -> &EqNode {
        &self.eq
    }

    pub fn filter(&self) -> &FilterNode {
        &self.filter
    }

    pub fn chorus(&self) -> &ChorusNode {
        &self.chorus
    }

    pub fn flanger(&self) -> &FlangerNode {
        &self.flanger
    }

    pub fn master(&self) -> &GainNode {
        &self.master
    }
}

impl GraphNode for EffectsChain {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.eq.render_block(out, ctx);
        self.filter.render_block(out, ctx);
        self.chorus.render_block(out, ctx);
        self.flanger.render_block(out, ctx);
        self.master.render_block(out, ctx);
        self.tap.render_block(out, ctx);
    }

    fn reset(&mut self) {
        self.eq.reset();
        self.filter.reset();
        self.chorus.reset();
        self.flanger.reset();
    }
}
