//! Cue parameters: what a phase should sound like, independent of how it is
//! rendered.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::OscillatorWaveform;

/// Slack allowed when checking that an envelope fits its cue.
const FIT_TOLERANCE: f32 = 1e-4;

/// Attack/release gain shape of a cue layer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    /// Seconds of linear rise from silence to `peak`.
    pub attack: f32,
    /// Seconds of exponential fall from `peak` to `floor`.
    pub release: f32,
    pub peak: f32,
    /// Positive gain the release ends on before the voice is cut.
    pub floor: f32,
}

impl EnvelopeShape {
    /// Seconds from trigger to the end of the release.
    pub fn length(&self) -> f32 {
        self.attack + self.release
    }

    fn is_well_formed(&self) -> bool {
        self.attack > 0.0
            && self.release > 0.0
            && self.peak > 0.0
            && self.floor > 0.0
            && self.floor < self.peak
    }
}

/// Short burst of breath noise layered under a wind cue.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseLayer {
    /// Seconds of noise after the trigger.
    pub length: f32,
    /// Raw noise amplitude before the envelope.
    pub level: f32,
    pub envelope: EnvelopeShape,
}

/// How the cue's tone is built.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CueTexture {
    /// A swept tone from `start_hz` to `end_hz` with breath noise under it.
    Wind { noise: NoiseLayer },
    /// The fundamental at `start_hz` plus one partial at `ratio` times it.
    Chime { ratio: f32, partial_gain: f32 },
}

/// Everything needed to synthesize one cue.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueSpec {
    pub texture: CueTexture,
    pub waveform: OscillatorWaveform,
    pub start_hz: f32,
    /// Equal to `start_hz` for cues that don't sweep.
    pub end_hz: f32,
    /// Seconds from trigger to the voice being cut.
    pub duration: f32,
    pub envelope: EnvelopeShape,
    pub cutoff_hz: f32,
    pub q: f32,
}

const BREATH_NOISE: NoiseLayer = NoiseLayer {
    length: 0.1,
    level: 0.1,
    envelope: EnvelopeShape {
        attack: 0.1,
        release: 0.9,
        peak: 0.05,
        floor: 0.001,
    },
};

impl CueSpec {
    /// Rising wind: 220 → 330 Hz over one second.
    pub const INHALE: CueSpec = CueSpec {
        texture: CueTexture::Wind {
            noise: BREATH_NOISE,
        },
        waveform: OscillatorWaveform::Sine,
        start_hz: 220.0,
        end_hz: 330.0,
        duration: 1.0,
        envelope: EnvelopeShape {
            attack: 0.1,
            release: 0.9,
            peak: 0.3,
            floor: 0.01,
        },
        cutoff_hz: 1000.0,
        q: 0.5,
    };

    /// Half-second chime on A4 with its octave.
    pub const HOLD: CueSpec = CueSpec {
        texture: CueTexture::Chime {
            ratio: 2.0,
            partial_gain: 0.3,
        },
        waveform: OscillatorWaveform::Sine,
        start_hz: 440.0,
        end_hz: 440.0,
        duration: 0.5,
        envelope: EnvelopeShape {
            attack: 0.01,
            release: 0.49,
            peak: 0.4,
            floor: 0.01,
        },
        cutoff_hz: 2000.0,
        q: 1.0,
    };

    /// Falling wind, the mirror of `INHALE`.
    pub const EXHALE: CueSpec = CueSpec {
        start_hz: 330.0,
        end_hz: 220.0,
        ..CueSpec::INHALE
    };

    /// True when the pitch moves during the cue.
    pub fn is_sweep(&self) -> bool {
        (self.end_hz - self.start_hz).abs() > f32::EPSILON
    }

    /// Check the cue's invariants: every envelope fits inside `duration`,
    /// gains are positive with a floor below the peak, pitches are audible.
    pub fn is_valid(&self) -> bool {
        let fits = |shape: &EnvelopeShape| {
            shape.is_well_formed() && shape.length() <= self.duration + FIT_TOLERANCE
        };

        let texture_ok = match self.texture {
            CueTexture::Wind { noise } => {
                fits(&noise.envelope) && noise.length > 0.0 && noise.length <= self.duration
            }
            CueTexture::Chime {
                ratio,
                partial_gain,
            } => ratio > 0.0 && partial_gain >= 0.0,
        };

        self.duration > 0.0
            && self.start_hz > 0.0
            && self.end_hz > 0.0
            && self.cutoff_hz > 0.0
            && self.q > 0.0
            && fits(&self.envelope)
            && texture_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for spec in [CueSpec::INHALE, CueSpec::HOLD, CueSpec::EXHALE] {
            assert!(spec.is_valid(), "{spec:?}");
        }
    }

    #[test]
    fn exhale_mirrors_inhale() {
        assert_eq!(CueSpec::INHALE.start_hz, CueSpec::EXHALE.end_hz);
        assert_eq!(CueSpec::INHALE.end_hz, CueSpec::EXHALE.start_hz);
        assert_eq!(CueSpec::INHALE.envelope, CueSpec::EXHALE.envelope);
        assert!(CueSpec::INHALE.start_hz < CueSpec::INHALE.end_hz);
    }

    #[test]
    fn hold_does_not_sweep() {
        assert!(!CueSpec::HOLD.is_sweep());
        assert!(CueSpec::INHALE.is_sweep());
    }

    #[test]
    fn envelope_longer_than_cue_is_rejected() {
        let mut spec = CueSpec::HOLD;
        spec.envelope.release = 0.8;
        assert!(!spec.is_valid());
    }

    #[test]
    fn floor_must_sit_below_peak() {
        let mut spec = CueSpec::HOLD;
        spec.envelope.floor = spec.envelope.peak;
        assert!(!spec.is_valid());
    }
}
