use crate::{
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/*
Parallel Signal Summing
=======================

Mix renders two sources and adds them. It is the additive counterpart to
Amplify (which multiplies).

  output = A + B

Levels are set on each source beforehand with `.gain()` or an envelope, so a
layered cue reads top to bottom:

  let chime = OscNode::sine().with_frequency(440.0)
      .mix(OscNode::sine().with_frequency(880.0).gain(0.3));

  let wind = tone.amplify(tone_env)
      .mix(OscNode::noise().with_length(0.1).gain(0.1).amplify(noise_env));

Both sources receive note_on. The pair stays active while either source is
active, so the longer of two gated layers decides when the voice is freed.
*/

pub struct Mix<A, B> {
    pub source_a: A,
    pub source_b: B,
    temp_buffer: Vec<f32>,
}

impl<A, B> Mix<A, B> {
    pub fn new(source_a: A, source_b: B) -> Self {
        Mix {
            source_a,
            source_b,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<A: GraphNode, B: GraphNode> GraphNode for Mix<A, B> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source_a.render_block(out, ctx);

        let frames = &mut self.temp_buffer[..out.len()];
        frames.fill(0.0);
        self.source_b.render_block(frames, ctx);

        for (o, b) in out.iter_mut().zip(frames.iter()) {
            *o += *b;
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source_a.note_on(ctx);
        self.source_b.note_on(ctx);
    }

    fn is_active(&self) -> bool {
        self.source_a.is_active() || self.source_b.is_active()
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{
        envelope::EnvNode, extensions::NodeExt, node::{GraphNode, RenderCtx}, oscillator::OscNode,
    };

    #[test]
    fn sums_both_sources() {
        let ctx = RenderCtx::new(48_000.0);
        let mut mixed = OscNode::square()
            .with_frequency(100.0)
            .gain(0.25)
            .mix(OscNode::square().with_frequency(100.0).gain(0.5));

        let mut buffer = vec![0.0f32; 64];
        mixed.render_block(&mut buffer, &ctx);

        assert!(buffer.iter().all(|&s| (s.abs() - 0.75).abs() < 1e-6));
    }

    #[test]
    fn active_until_longest_layer_finishes() {
        let ctx = RenderCtx::new(1_000.0);
        let mut mixed = OscNode::sine()
            .amplify(EnvNode::cue(0.01, 0.04, 0.3, 0.01))
            .mix(OscNode::sine().amplify(EnvNode::cue(0.01, 0.19, 0.3, 0.01)));
        mixed.note_on(&ctx);

        let mut buffer = vec![0.0f32; 100];
        mixed.render_block(&mut buffer, &ctx);
        assert!(mixed.is_active());

        mixed.render_block(&mut buffer, &ctx);
        assert!(!mixed.is_active());
    }
}
