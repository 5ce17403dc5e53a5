use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

/*
Phase-Accumulator Oscillator
============================

Every periodic waveform here is a function of a single normalized phase in
[0, 1). Each sample we read the waveform at the current phase and then move
the phase forward by `frequency / sample_rate`, wrapping at 1.0.

    phase += frequency / sample_rate
    if phase >= 1.0 { phase -= 1.0 }

Because the frequency is read per sample, a caller can glide the pitch while
rendering (the inhale/exhale sweeps) without any discontinuity: only the
speed of the phase changes, never its position.

Waveforms
---------

  Sine       sin(2π·phase). Pure tone, used for cues and the deep drone.
  Triangle   Starts at 0 like the sine, peaks at phase 0.25. Soft odd
             harmonics; used for the upper ambient voices.
  Saw        2·phase - 1. Bright, every harmonic.
  Square     +1 for the first half-period, -1 for the second.
  Noise      White noise from a xorshift generator. Ignores frequency.

The noise generator is a 32-bit xorshift: no allocation, no locks, and the
same seed always gives the same sequence, which keeps renders reproducible.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Triangle,
    Saw,
    Square,
    Noise,
}

const NOISE_SEED: u32 = 0x9E37_79B9;

pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
    rng: u32,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
            rng: NOISE_SEED,
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

    /// Produce one sample at `frequency` and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let phase = self.phase;
        let sample = match self.waveform {
            OscillatorWaveform::Sine => (TAU * phase).sin(),
            OscillatorWaveform::Triangle => {
                let shifted = (phase + 0.25).fract();
                1.0 - 4.0 * (shifted - 0.5).abs()
            }
            OscillatorWaveform::Saw => 2.0 * phase - 1.0,
            OscillatorWaveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            OscillatorWaveform::Noise => self.next_noise(),
        };

        self.phase += frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase = self.phase.fract();
        }

        sample
    }

    /// Fill `destination` at a constant frequency.
    pub fn render(&mut self, destination: &mut [f32], frequency: f32, ctx: &RenderCtx) {
        for sample in destination.iter_mut() {
            *sample = self.next_sample(frequency, ctx.sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.rng = NOISE_SEED;
    }

    #[inline]
    fn next_noise(&mut self) -> f32 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}
