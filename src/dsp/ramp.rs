use crate::{config::GAIN_FLOOR, graph::node::RenderCtx, MIN_TIME};

/*
Parameter Ramps
===============

Any audible parameter that jumps from one value to another in a single sample
produces a click: the waveform acquires a discontinuity, which is broadband
energy. A Ramp moves a parameter to its target over a span of samples
instead.

Vocabulary
----------

  start      The value when the ramp was requested. Ramps always start from
             the CURRENT value, so a fade interrupted halfway continues from
             wherever it got to.

  target     The value the ramp ends on.

  progress   elapsed_samples / total_samples, from 0.0 to 1.0.


Two Curves
----------

LINEAR: equal steps per sample.

    value = start + (target - start) * progress

  Used for attacks and fades: predictable, and it can reach exactly 0.0.

EXPONENTIAL: equal RATIOS per sample.

    value = start * (target / start) ^ progress

  Our ears hear loudness roughly logarithmically, so an exponential decay
  sounds like an even fade where a linear one seems to "fall off a cliff" at
  the end. Also used for pitch glides, since pitch is logarithmic too.

  The formula divides by `start` and never reaches zero, so both ends are
  held at or above GAIN_FLOOR. A release that should end in silence ramps to
  the floor and the caller cuts the final sliver.


Implementation Notes
--------------------

The ramp stores its duration in seconds and computes the sample count fresh
each call from the render context, the same way the envelope computes its
increments. The ramp is rate-agnostic until it is rendered.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampCurve {
    Linear,
    Exponential,
}

#[derive(Debug, Clone)]
pub struct Ramp {
    value: f32,
    start: f32,
    target: f32,
    curve: RampCurve,
    duration: f32,
    elapsed_samples: u32,
    active: bool,
}

impl Ramp {
    pub fn new(initial: f32) -> Self {
        Self {
            value: initial,
            start: initial,
            target: initial,
            curve: RampCurve::Linear,
            duration: MIN_TIME,
            elapsed_samples: 0,
            active: false,
        }
    }

    /// Jump straight to `value`, cancelling any ramp in flight.
    ///
    /// Only for values that are not yet audible (voice setup, reset).
    pub fn set(&mut self, value: f32) {
        self.value = value;
        self.start = value;
        self.target = value;
        self.active = false;
        self.elapsed_samples = 0;
    }

    /// Move from the current value to `target` over `seconds`.
    pub fn ramp_to(&mut self, target: f32, seconds: f32, curve: RampCurve) {
        let (start, target) = match curve {
            RampCurve::Linear => (self.value, target),
            RampCurve::Exponential => (self.value.max(GAIN_FLOOR), target.max(GAIN_FLOOR)),
        };

        self.start = start;
        self.target = target;
        self.curve = curve;
        self.duration = seconds.max(MIN_TIME);
        self.elapsed_samples = 0;
        self.active = true;
    }

    /// Advance by one sample and return the new value.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        if !self.active {
            return self.value;
        }

        let total_samples = (self.duration * sample_rate).round().max(1.0) as u32;
        self.elapsed_samples = self.elapsed_samples.saturating_add(1);

        if self.elapsed_samples >= total_samples {
            self.value = self.target;
            self.active = false;
            return self.value;
        }

        let progress = self.elapsed_samples as f32 / total_samples as f32;
        self.value = match self.curve {
            RampCurve::Linear => self.start + (self.target - self.start) * progress,
            RampCurve::Exponential => self.start * (self.target / self.start).powf(progress),
        };

        self.value
    }

    /// Render a block of ramp values.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(ctx.sample_rate);
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_ramping(&self) -> bool {
        self.active
    }
}
