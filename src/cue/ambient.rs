//! The continuous background drone.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::oscillator::OscillatorWaveform,
    graph::{
        extensions::NodeExt,
        filter::FilterNode,
        lfo::LfoNode,
        node::{GraphNode, RenderCtx},
        oscillator::OscNode,
    },
    MAX_BLOCK_SIZE,
};

/// One sustained oscillator in the ambient layer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientVoiceSpec {
    pub frequency: f32,
    pub waveform: OscillatorWaveform,
    /// Base gain the voice swells around.
    pub gain: f32,
    /// Rate of the slow gain swell in Hz.
    pub modulation_hz: f32,
}

/// Deep drone, low harmonic, mid pad, upper harmonic.
pub const AMBIENT_VOICES: [AmbientVoiceSpec; 4] = [
    AmbientVoiceSpec {
        frequency: 55.0,
        waveform: OscillatorWaveform::Sine,
        gain: 0.1,
        modulation_hz: 0.1,
    },
    AmbientVoiceSpec {
        frequency: 110.0,
        waveform: OscillatorWaveform::Triangle,
        gain: 0.08,
        modulation_hz: 0.15,
    },
    AmbientVoiceSpec {
        frequency: 220.0,
        waveform: OscillatorWaveform::Sine,
        gain: 0.06,
        modulation_hz: 0.2,
    },
    AmbientVoiceSpec {
        frequency: 330.0,
        waveform: OscillatorWaveform::Triangle,
        gain: 0.04,
        modulation_hz: 0.25,
    },
];

pub const AMBIENT_CUTOFF_HZ: f32 = 800.0;
pub const AMBIENT_Q: f32 = 1.0;
/// How far each voice's gain swings either side of its base.
pub const MODULATION_DEPTH: f32 = 0.02;

/// Sum of the ambient voices, each low-passed with a slow gain swell.
///
/// The oscillators never stop: fades, mute and session stop only move the
/// ambient bus gain, so restarting is seamless.
pub struct AmbientLayer {
    voices: Vec<Box<dyn GraphNode>>,
    voice_buffer: Vec<f32>,
}

impl AmbientLayer {
    pub fn new(specs: &[AmbientVoiceSpec]) -> Self {
        let voices = specs
            .iter()
            .map(|spec| {
                let voice = OscNode::new(spec.waveform)
                    .with_frequency(spec.frequency)
                    .through(FilterNode::lowpass(AMBIENT_CUTOFF_HZ).with_q(AMBIENT_Q))
                    .amplify(
                        LfoNode::sine(spec.modulation_hz).around(spec.gain, MODULATION_DEPTH),
                    );
                Box::new(voice) as Box<dyn GraphNode>
            })
            .collect();

        Self {
            voices,
            voice_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }
}

impl Default for AmbientLayer {
    fn default() -> Self {
        Self::new(&AMBIENT_VOICES)
    }
}

impl GraphNode for AmbientLayer {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);
        for voice in &mut self.voices {
            let frames = &mut self.voice_buffer[..out.len()];
            voice.render_block(frames, ctx);
            for (o, v) in out.iter_mut().zip(frames.iter()) {
                *o += *v;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_voices() {
        let ctx = RenderCtx::new(48_000.0);
        let mut layer = AmbientLayer::default();
        assert_eq!(layer.voice_count(), 4);

        let mut buffer = vec![0.0f32; 2048];
        for _ in 0..4 {
            layer.render_block(&mut buffer, &ctx);
        }

        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let ceiling: f32 = AMBIENT_VOICES
            .iter()
            .map(|v| v.gain + MODULATION_DEPTH)
            .sum();
        assert!(peak > 0.05, "ambient layer too quiet: {peak}");
        assert!(peak <= ceiling * 1.5, "ambient layer too loud: {peak}");
    }

    #[test]
    fn voice_gains_descend_with_pitch() {
        assert!(AMBIENT_VOICES
            .windows(2)
            .all(|w| w[0].frequency < w[1].frequency && w[0].gain > w[1].gain));
    }
}
