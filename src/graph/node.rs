/// Context passed to graph nodes during rendering
///
/// Nodes in this crate carry their own pitch (cue sweeps, ambient drones), so
/// the only thing the renderer has to tell them is how fast time moves.
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
/// Nodes render audio in blocks and respond to trigger events. A cue voice is
/// triggered once with `note_on` and reports `is_active() == false` when its
/// envelope has finished, at which point the mixer drops it.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Triggered when the voice starts sounding
    ///
    /// Default implementation does nothing (passthrough nodes).
    fn note_on(&mut self, _ctx: &RenderCtx) {
        // Default: do nothing
    }

    /// Check if this node is still producing sound
    ///
    /// Used by the mixer to know when a cue voice can be freed.
    fn is_active(&self) -> bool {
        true
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        (**self).note_on(ctx)
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}
