use crate::{
    dsp::envelope::Envelope,
    graph::node::{GraphNode, RenderCtx},
};

/// Envelope generator node: outputs the envelope level as a signal, meant to
/// be the modulator of an `.amplify()`.
pub struct EnvNode {
    env: Envelope,
}

impl EnvNode {
    /// Linear attack to `peak`, exponential release to `floor`.
    pub fn cue(attack: f32, release: f32, peak: f32, floor: f32) -> Self {
        Self {
            env: Envelope::cue(attack, release, peak, floor),
        }
    }

    /// Total audible length in seconds.
    pub fn length(&self) -> f32 {
        self.env.length()
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.env.render(out, ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.env.note_on();
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }
}
