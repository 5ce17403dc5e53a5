use crate::{
    dsp::oscillator::OscillatorBlock,
    graph::node::{GraphNode, RenderCtx},
};

/*
LFO (Low Frequency Oscillator)
==============================

An oscillator below the audible range, used here to make the ambient layer
breathe: each drone's gain wanders slowly around its base level.

  gain(t) = center + depth * lfo(t)

With center = 0.1 and depth = 0.02 the drone swells between 0.08 and 0.12.
At 0.1 Hz one swell takes ten seconds. Each ambient voice gets a slightly
different rate (0.10, 0.15, 0.20, 0.25 Hz) so the swells drift in and out of
phase with one another and the texture never loops audibly.

Typical ranges:

    0.01 - 0.1 Hz   Very slow sweeps, evolving textures
    0.1 - 0.5 Hz    Slow swells (the ambient layer lives here)
    2 - 7 Hz        Vibrato, tremolo
*/

pub struct LfoNode {
    osc: OscillatorBlock,
    frequency: f32, // Fixed rate in Hz
    center: f32,
    depth: f32,
}

impl LfoNode {
    pub fn sine(frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::sine(),
            frequency,
            center: 0.0,
            depth: 1.0,
        }
    }

    /// Swing `depth` either side of `center` instead of ±1.
    pub fn around(mut self, center: f32, depth: f32) -> Self {
        self.center = center;
        self.depth = depth;
        self
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            let swing = self.osc.next_sample(self.frequency, ctx.sample_rate);
            *sample = self.center + self.depth * swing;
        }
    }
}
