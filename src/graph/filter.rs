use crate::{
    dsp::filter::SVFilter,
    graph::node::{GraphNode, RenderCtx},
};

/*
State-Variable Filter Node
==========================

Low-pass filtering is what turns a bare sine sweep into "wind" and a bare
two-partial chime into something bell-like rather than beepy. The ambient
drones go through one as well so their triangle overtones never get bright.

  Cue / layer        Cutoff    Q
  -----------------  --------  ----
  inhale / exhale    1000 Hz   0.5   gentle, no resonant bump
  hold chime         2000 Hz   1.0   slight ring at the cutoff
  ambient voices      800 Hz   1.0   dark, unobtrusive

Example usage:
  let warm = OscNode::sine()
      .sweep(330.0, 220.0, 1.0)
      .through(FilterNode::lowpass(1000.0).with_q(0.5));
*/

pub struct FilterNode {
    filter: SVFilter,
}

impl FilterNode {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        FilterNode {
            filter: SVFilter::lowpass(cutoff_hz),
        }
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.filter.set_q(q);
        self
    }

    pub fn cutoff(&self) -> f32 {
        self.filter.cutoff_hz
    }

    pub fn q(&self) -> f32 {
        self.filter.q
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.filter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_cutoff_and_q() {
        let node = FilterNode::lowpass(2000.0).with_q(1.0);
        assert_eq!(node.cutoff(), 2000.0);
        assert_eq!(node.q(), 1.0);
    }

    #[test]
    fn note_on_clears_filter_memory() {
        let ctx = RenderCtx::new(48_000.0);
        let mut node = FilterNode::lowpass(500.0);
        let mut loud = vec![1.0f32; 256];
        node.render_block(&mut loud, &ctx);

        node.note_on(&ctx);
        let mut silent = vec![0.0f32; 16];
        node.render_block(&mut silent, &ctx);

        assert!(silent.iter().all(|&s| s == 0.0));
    }
}
