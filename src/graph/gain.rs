use crate::graph::node::{GraphNode, RenderCtx};

/// Scale a node's output by a constant.
///
/// Used for fixed partial levels (the chime's octave partial at 0.3) and for
/// the amplitude of the breath-noise burst.
pub struct Gain<N> {
    node: N,
    gain: f32,
}

impl<N> Gain<N> {
    pub fn new(node: N, gain: f32) -> Self {
        Self { node, gain }
    }
}

impl<N: GraphNode> GraphNode for Gain<N> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.node.render_block(out, ctx);
        for sample in out.iter_mut() {
            *sample *= self.gain;
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.node.note_on(ctx);
    }

    fn is_active(&self) -> bool {
        self.node.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{extensions::NodeExt, oscillator::OscNode};

    #[test]
    fn scales_output() {
        let ctx = RenderCtx::new(48_000.0);
        let mut node = OscNode::square().with_frequency(100.0).gain(0.3);
        let mut buffer = vec![0.0f32; 64];
        node.render_block(&mut buffer, &ctx);

        assert!(buffer.iter().all(|&s| (s.abs() - 0.3).abs() < 1e-6));
    }
}
