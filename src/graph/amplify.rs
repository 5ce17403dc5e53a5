use crate::{
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/// Multiply a signal by a modulator, sample by sample.
///
/// The modulator is usually an envelope (a cue) or an LFO swinging around a
/// base gain (an ambient voice). The modulator decides when the pair is done:
/// once a cue envelope goes idle the voice is silent no matter what the
/// oscillator is still doing.
pub struct Amplify<N, M> {
    pub signal: N,
    pub modulator: M,
    temp_buffer: Vec<f32>,
}

impl<N, M> Amplify<N, M> {
    pub fn new(signal: N, modulator: M) -> Self {
        Self {
            signal,
            modulator,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<N: GraphNode, M: GraphNode> GraphNode for Amplify<N, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.signal.render_block(out, ctx);

        // Slice temp buffer to match output size (RT-safe, no allocation)
        let frames = &mut self.temp_buffer[..out.len()];
        frames.fill(0.0);
        self.modulator.render_block(frames, ctx);

        for (o, m) in out.iter_mut().zip(frames.iter()) {
            *o *= *m;
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.signal.note_on(ctx);
        self.modulator.note_on(ctx);
    }

    fn is_active(&self) -> bool {
        self.modulator.is_active()
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{
        envelope::EnvNode, extensions::NodeExt, node::{GraphNode, RenderCtx}, oscillator::OscNode,
    };

    #[test]
    fn envelope_gates_the_signal() {
        let ctx = RenderCtx::new(1_000.0);
        let mut voice = OscNode::square()
            .with_frequency(100.0)
            .amplify(EnvNode::cue(0.01, 0.09, 0.5, 0.01));
        voice.note_on(&ctx);

        let mut buffer = vec![0.0f32; 200];
        voice.render_block(&mut buffer, &ctx);

        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert!(peak <= 0.5 + 1e-6 && peak > 0.4);
        assert!(buffer[100..].iter().all(|&s| s == 0.0));
        assert!(!voice.is_active());
    }
}
