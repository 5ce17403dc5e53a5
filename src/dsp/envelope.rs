use crate::{
    dsp::ramp::{Ramp, RampCurve},
    graph::node::RenderCtx,
    MIN_TIME,
};

/*
Cue Envelope (Attack / Release)
===============================

A breathing cue is a one-shot: it is triggered on phase entry and dies on its
own. There is no key to hold, so there is no sustain stage. The shape is two
ramps back to back.

Vocabulary
----------

  peak      Gain reached at the end of the attack.

  floor     Small positive gain the release decays to. The release is
            exponential, which can't reach zero, so the envelope cuts from
            the floor to silence when the release completes. At a floor of
            0.01 that last step is 40 dB below the peak.

  attack    Seconds of linear rise, 0 → peak.

  release   Seconds of exponential fall, peak → floor.


The Shape
---------

  Level
   peak ┐  ╱╲
        │ ╱  ╲
        │╱    ╲__
  floor │        ╲___________
    0.0 └──────────────────── ┴──→ Time
        Attack   Release       cut

Attack is linear because a fast linear onset sounds like a soft strike.
Release is exponential because it is heard as an even fade.


The State Machine
-----------------

    ┌──────┐ note_on  ┌────────┐ ramp done ┌─────────┐ ramp done ┌──────┐
    │ Idle │ ───────→ │ Attack │ ────────→ │ Release │ ────────→ │ Idle │
    └──────┘          └────────┘           └─────────┘           └──────┘

The release starts from wherever the attack ended. A cue's total length is attack + release, which
`CueSpec::is_valid` keeps within its duration.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Not triggered, or finished; level = 0
    Attack,  // Linear ramp up to the peak
    Release, // Exponential ramp down to the floor
}

pub struct Envelope {
    attack_time: f32,
    release_time: f32,
    peak: f32,
    floor: f32,

    stage: EnvelopeState,
    ramp: Ramp,
}

impl Envelope {
    /// Build an attack/release envelope.
    ///
    /// Times are clamped to at least one sample at 48 kHz; the floor is kept
    /// strictly below the peak.
    pub fn cue(attack: f32, release: f32, peak: f32, floor: f32) -> Self {
        let peak = peak.clamp(0.0, 1.0);
        Self {
            attack_time: attack.max(MIN_TIME),
            release_time: release.max(MIN_TIME),
            peak,
            floor: floor.clamp(0.0, peak),
            stage: EnvelopeState::Idle,
            ramp: Ramp::new(0.0),
        }
    }

    /// Trigger: restart the attack from silence.
    pub fn note_on(&mut self) {
        self.ramp.set(0.0);
        self.ramp
            .ramp_to(self.peak, self.attack_time, RampCurve::Linear);
        self.stage = EnvelopeState::Attack;
    }

    fn begin_release(&mut self) {
        self.ramp
            .ramp_to(self.floor, self.release_time, RampCurve::Exponential);
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample and return its level.
    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        match self.stage {
            EnvelopeState::Idle => 0.0,
            EnvelopeState::Attack => {
                let level = self.ramp.next_sample(ctx.sample_rate);
                if !self.ramp.is_ramping() {
                    self.begin_release();
                }
                level
            }
            EnvelopeState::Release => {
                let level = self.ramp.next_sample(ctx.sample_rate);
                if !self.ramp.is_ramping() {
                    self.ramp.set(0.0);
                    self.stage = EnvelopeState::Idle;
                }
                level
            }
        }
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(ctx);
        }
    }

    /// Returns true while the envelope is attacking or releasing.
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    /// Total audible length in seconds.
    pub fn length(&self) -> f32 {
        self.attack_time + self.release_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn render_samples(env: &mut Envelope, samples: usize) -> Vec<f32> {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        (0..samples).map(|_| env.next_sample(&ctx)).collect()
    }

    #[test]
    fn attack_reaches_peak() {
        let mut env = Envelope::cue(0.01, 0.1, 0.4, 0.01);
        env.note_on();
        let levels = render_samples(&mut env, 10);

        assert!((levels[9] - 0.4).abs() < 1e-6, "expected attack to reach peak");
        assert_eq!(env.state(), EnvelopeState::Release);
    }

    #[test]
    fn release_decays_to_floor_then_idles() {
        let mut env = Envelope::cue(0.01, 0.49, 0.4, 0.01);
        env.note_on();
        let levels = render_samples(&mut env, 500);

        let release = &levels[10..];
        assert!(release.windows(2).all(|w| w[1] <= w[0]));
        assert!((levels[499] - 0.01).abs() < 1e-6);
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert!(!env.is_active());
        assert_eq!(render_samples(&mut env, 1)[0], 0.0);
    }

    #[test]
    fn idle_envelope_is_silent() {
        let mut env = Envelope::cue(0.01, 0.1, 0.3, 0.01);
        assert!(render_samples(&mut env, 20).iter().all(|&l| l == 0.0));
        assert!(!env.is_active());
    }
}
