/// Context passed to graph nodes during rendering
///
/// Effects in the master chain only need the output sample rate. Everything
/// time-varying (parameters, envelopes) is carried by the nodes themselves.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }
}

/// Core trait for audio processing graph nodes
///
/// Nodes process a mono block in place. They must not allocate, lock or
/// block inside `render_block`.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Clear delay lines and filter memory.
    ///
    /// Default implementation does nothing (stateless nodes).
    fn reset(&mut self) {}
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
