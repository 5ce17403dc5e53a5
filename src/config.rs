//! Session audio settings and the fixed mixing constants.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ceiling gain of the ambient bus at 100 % volume.
///
/// The ambient layer plays for the whole session, so it sits well below the
/// cue bus.
pub const AMBIENT_CEILING: f32 = 0.3;

/// Ceiling gain of the cue bus at 100 % volume.
pub const CUES_CEILING: f32 = 0.7;

/// Seconds for the ambient layer to fade in on session start or unmute.
pub const AMBIENT_FADE_IN_SECS: f32 = 2.0;

/// Seconds for the ambient layer to fade out on session stop or mute.
pub const AMBIENT_FADE_OUT_SECS: f32 = 1.0;

/// Smoothing applied to volume changes so a slider drag never clicks.
pub const VOLUME_SMOOTHING_SECS: f32 = 0.05;

/// Smallest gain an exponential ramp may target.
pub const GAIN_FLOOR: f32 = 1e-4;

/// Maximum number of cue voices rendered at once.
pub const MAX_CUE_VOICES: usize = 8;

/// Seconds a stolen cue voice takes to fade out before it is dropped.
pub const STEAL_FADE_SECS: f32 = 0.01;

/// Capacity of the control → audio command queue.
pub const COMMAND_QUEUE_SIZE: usize = 64;

/// Clamp a user-facing volume percentage into `0.0..=100.0`.
///
/// Non-finite input is treated as silence.
pub fn clamp_volume(percent: f32) -> f32 {
    if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Compose a bus volume percentage with the bus ceiling.
#[inline]
pub fn bus_gain(percent: f32, ceiling: f32) -> f32 {
    ceiling * clamp_volume(percent) / 100.0
}

/// User-adjustable audio settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSettings {
    /// Ambient bus volume, 0-100.
    pub ambient_volume: f32,
    /// Cue bus volume, 0-100.
    pub cues_volume: f32,
    /// Whether cues and the ambient layer are audible.
    pub sound_enabled: bool,
}

impl AudioSettings {
    pub fn new() -> Self {
        Self {
            ambient_volume: 50.0,
            cues_volume: 80.0,
            sound_enabled: true,
        }
    }

    pub fn with_ambient_volume(mut self, percent: f32) -> Self {
        self.ambient_volume = clamp_volume(percent);
        self
    }

    pub fn with_cues_volume(mut self, percent: f32) -> Self {
        self.cues_volume = clamp_volume(percent);
        self
    }

    pub fn with_sound_enabled(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }

    /// Ambient bus gain after the ceiling is applied.
    pub fn ambient_gain(&self) -> f32 {
        bus_gain(self.ambient_volume, AMBIENT_CEILING)
    }

    /// Cue bus gain after the ceiling is applied.
    pub fn cues_gain(&self) -> f32 {
        bus_gain(self.cues_volume, CUES_CEILING)
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_is_clamped() {
        assert_eq!(clamp_volume(-20.0), 0.0);
        assert_eq!(clamp_volume(150.0), 100.0);
        assert_eq!(clamp_volume(f32::NAN), 0.0);
        assert_eq!(clamp_volume(42.0), 42.0);
    }

    #[test]
    fn ambient_ceiling_is_below_cue_ceiling() {
        let settings = AudioSettings::new()
            .with_ambient_volume(100.0)
            .with_cues_volume(100.0);

        assert!((settings.ambient_gain() - AMBIENT_CEILING).abs() < 1e-6);
        assert!((settings.cues_gain() - CUES_CEILING).abs() < 1e-6);
        assert!(settings.ambient_gain() < settings.cues_gain());
    }

    #[test]
    fn builder_clamps_out_of_range_volume() {
        let settings = AudioSettings::new().with_cues_volume(400.0);
        assert_eq!(settings.cues_volume, 100.0);
    }
}
