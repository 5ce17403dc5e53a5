//! Low-level DSP primitives used by the graph nodes.
//!
//! These components are allocation-free and realtime-safe, so they can live
//! directly inside voice structs. They stay focused on the signal math and
//! leave triggering and composition to the graph layer.

/// Attack/release cue envelope.
pub mod envelope;
/// State-variable filter with low-pass and high-pass outputs.
pub mod filter;
/// Oscillator waveforms and noise sources.
pub mod oscillator;
/// Linear and exponential parameter ramps.
pub mod ramp;

pub use envelope::EnvelopeState;
pub use ramp::{Ramp, RampCurve};
