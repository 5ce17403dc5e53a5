//! Everything that makes sound: cue recipes, the ambient layer, the engine
//! boundary and the synthesizer that drives it.

/// Continuous background drone.
pub mod ambient;
/// Control/audio split and the engine trait.
pub mod engine;
/// Per-phase cue recipes.
pub mod spec;
/// Phase-driven cue and ambient control.
pub mod synth;
/// Builds a render graph from a cue recipe.
pub mod voice;

pub use engine::{Bus, NullEngine, SynthesisEngine};
#[cfg(feature = "rtrb")]
pub use engine::{GraphEngine, Mixer};
pub use spec::CueSpec;
pub use synth::CueSynthesizer;
