use crate::dsp::{
    oscillator::{OscillatorBlock, OscillatorWaveform},
    ramp::{Ramp, RampCurve},
};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Audio Oscillator Node
=====================

Wraps an OscillatorBlock with the pitch behaviour a breathing cue needs.
Every OscNode owns its frequency; there is no keyboard to follow.

Fixed pitch
-----------

  OscNode::sine().with_frequency(440.0)

The hold chime and the ambient drones sit on one pitch for their whole life.

Sweep
-----

  OscNode::sine().sweep(220.0, 330.0, 1.0)

On note_on the pitch starts at 220 Hz and glides exponentially to 330 Hz
over one second, then stays there. An exponential glide moves by equal
musical intervals per unit time, so a rising fifth sounds even from start to
end. The inhale cue rises, the exhale cue mirrors it downwards.

Bounded length
--------------

  OscNode::noise().with_length(0.1)

Outputs for the first 100 ms after note_on and silence afterwards: a short
burst of breath noise under the swept tone, the way a one-shot sample buffer
plays once and ends.

Example usage:
  // Inhale: rising tone, softened, shaped by a cue envelope
  let wind = OscNode::sine()
      .sweep(220.0, 330.0, 1.0)
      .through(FilterNode::lowpass(1000.0).with_q(0.5))
      .amplify(EnvNode::cue(0.1, 0.9, 0.3, 0.01));
*/

#[derive(Debug, Clone, Copy)]
struct Sweep {
    start_hz: f32,
    end_hz: f32,
    seconds: f32,
}

pub struct OscNode {
    osc: OscillatorBlock,
    frequency: Ramp,
    sweep: Option<Sweep>,
    /// Seconds of output after note_on; None plays forever.
    length: Option<f32>,
    elapsed_samples: u32,
}

impl OscNode {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
            frequency: Ramp::new(440.0),
            sweep: None,
            length: None,
            elapsed_samples: 0,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorWaveform::Triangle)
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorWaveform::Saw)
    }

    pub fn square() -> Self {
        Self::new(OscillatorWaveform::Square)
    }

    pub fn noise() -> Self {
        Self::new(OscillatorWaveform::Noise)
    }

    /// Hold a fixed pitch.
    pub fn with_frequency(mut self, freq: f32) -> Self {
        self.frequency.set(freq);
        self.sweep = None;
        self
    }

    /// Glide exponentially from `start_hz` to `end_hz` over `seconds` after note_on.
    pub fn sweep(mut self, start_hz: f32, end_hz: f32, seconds: f32) -> Self {
        self.frequency.set(start_hz);
        self.sweep = Some(Sweep {
            start_hz,
            end_hz,
            seconds,
        });
        self
    }

    /// Emit sound only for the first `seconds` after note_on.
    pub fn with_length(mut self, seconds: f32) -> Self {
        self.length = Some(seconds.max(0.0));
        self
    }

    /// Current pitch in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency.value()
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let limit = self
            .length
            .map(|seconds| (seconds * ctx.sample_rate).round() as u32);

        for sample in out.iter_mut() {
            let within = limit.map_or(true, |limit| self.elapsed_samples < limit);
            if !within {
                *sample = 0.0;
                continue;
            }

            let freq = self.frequency.next_sample(ctx.sample_rate);
            *sample = self.osc.next_sample(freq, ctx.sample_rate);
            self.elapsed_samples = self.elapsed_samples.saturating_add(1);
        }
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.reset();
        self.elapsed_samples = 0;

        if let Some(sweep) = self.sweep {
            self.frequency.set(sweep.start_hz);
            self.frequency
                .ramp_to(sweep.end_hz, sweep.seconds, RampCurve::Exponential);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn sweep_glides_between_endpoints() {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        let mut osc = OscNode::sine().sweep(220.0, 330.0, 0.1);
        osc.note_on(&ctx);

        let mut buffer = vec![0.0f32; 2400];
        osc.render_block(&mut buffer, &ctx);
        let halfway = osc.frequency();
        assert!(halfway > 220.0 && halfway < 330.0, "got {halfway}");

        let mut rest = vec![0.0f32; 2400];
        osc.render_block(&mut rest, &ctx);
        assert!((osc.frequency() - 330.0).abs() < 1e-3);
    }

    #[test]
    fn falling_sweep_mirrors_rising_sweep() {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        let mut osc = OscNode::sine().sweep(330.0, 220.0, 0.05);
        osc.note_on(&ctx);

        let mut buffer = vec![0.0f32; 4800];
        osc.render_block(&mut buffer, &ctx);
        assert!((osc.frequency() - 220.0).abs() < 1e-3);
    }

    #[test]
    fn bounded_length_falls_silent() {
        let ctx = RenderCtx::new(1_000.0);
        let mut noise = OscNode::noise().with_length(0.1);
        noise.note_on(&ctx);

        let mut buffer = vec![0.0f32; 200];
        noise.render_block(&mut buffer, &ctx);

        assert!(buffer[..100].iter().any(|s| s.abs() > 0.0));
        assert!(buffer[100..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn fixed_pitch_ignores_note_on() {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        let mut osc = OscNode::triangle().with_frequency(110.0);
        osc.note_on(&ctx);

        let mut buffer = vec![0.0f32; 256];
        osc.render_block(&mut buffer, &ctx);
        assert_eq!(osc.frequency(), 110.0);
    }
}
