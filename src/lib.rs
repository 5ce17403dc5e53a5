pub mod config;
pub mod cue; // Cue synthesis, ambient layer and the audio engine boundary
pub mod dsp;
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod session; // Breathing phase state machine

pub use config::AudioSettings;
pub use cue::{CueSpec, CueSynthesizer};
pub use error::AudioError;
pub use session::{BreathingSession, Phase, PhaseName, PhaseScheduler, SessionObserver};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
