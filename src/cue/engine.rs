//! The boundary between cue decisions and the audio render thread.
//!
//! `CueSynthesizer` talks to a `SynthesisEngine`. The real engine
//! (`GraphEngine`) only builds voices and pushes commands onto a lock-free
//! queue; the paired `Mixer` drains that queue at the top of every block on
//! the audio thread. Neither side ever waits for the other.
//!
//! ```text
//!   control thread                       audio thread
//!   ──────────────                       ────────────
//!   CueSynthesizer
//!     └─ GraphEngine ── AudioCommand ──→ Mixer::render()
//!          (Producer)     (rtrb ring)      ├─ ambient layer × level × fade
//!                                          └─ cue voices    × level
//! ```

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::{cue::spec::CueSpec, error::AudioError};
#[cfg(feature = "rtrb")]
use crate::{
    config::{
        AudioSettings, COMMAND_QUEUE_SIZE, MAX_CUE_VOICES, STEAL_FADE_SECS,
        VOLUME_SMOOTHING_SECS,
    },
    cue::{ambient::AmbientLayer, voice::build_voice},
    dsp::ramp::{Ramp, RampCurve},
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/// The two independently scaled gain stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bus {
    Ambient,
    Cues,
}

/// What the synthesizer needs from an audio backend.
///
/// Every call is fire-and-forget: it sets up parameters or voices and returns
/// immediately; the sound then plays on the backend's own clock.
pub trait SynthesisEngine {
    /// Start one cue voice now.
    fn play_cue(&mut self, spec: &CueSpec) -> Result<(), AudioError>;

    /// Ramp the ambient fade stage (0.0 silent, 1.0 full) over `seconds`.
    fn set_ambient_gain(&mut self, level: f32, seconds: f32) -> Result<(), AudioError>;

    /// Set a bus's volume gain (ceiling already applied), smoothed briefly.
    fn set_bus_volume(&mut self, bus: Bus, gain: f32) -> Result<(), AudioError>;

    /// True when the engine actually produces sound.
    fn is_live(&self) -> bool {
        true
    }
}

/// Engine used before audio is initialized, or when the platform refused to
/// give us an output. Accepts everything, plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEngine;

impl SynthesisEngine for NullEngine {
    fn play_cue(&mut self, _spec: &CueSpec) -> Result<(), AudioError> {
        Ok(())
    }

    fn set_ambient_gain(&mut self, _level: f32, _seconds: f32) -> Result<(), AudioError> {
        Ok(())
    }

    fn set_bus_volume(&mut self, _bus: Bus, _gain: f32) -> Result<(), AudioError> {
        Ok(())
    }

    fn is_live(&self) -> bool {
        false
    }
}

/// Messages from the control thread to the mixer.
#[cfg(feature = "rtrb")]
pub enum AudioCommand {
    /// A freshly built cue voice, not yet triggered.
    PlayCue(Box<dyn GraphNode>),
    AmbientFade { level: f32, seconds: f32 },
    BusVolume { bus: Bus, gain: f32 },
}

/// Control-side half of the graph engine.
#[cfg(feature = "rtrb")]
pub struct GraphEngine {
    tx: Producer<AudioCommand>,
}

#[cfg(feature = "rtrb")]
impl GraphEngine {
    /// Create a connected engine/mixer pair. Move the mixer into the audio
    /// callback; keep the engine on the control thread.
    pub fn new(settings: &AudioSettings) -> (Self, Mixer) {
        let (tx, rx) = RingBuffer::<AudioCommand>::new(COMMAND_QUEUE_SIZE);
        (Self { tx }, Mixer::new(settings, rx))
    }

    fn send(&mut self, command: AudioCommand) -> Result<(), AudioError> {
        if self.tx.is_abandoned() {
            return Err(AudioError::Disconnected);
        }

        match self.tx.push(command) {
            Ok(()) => Ok(()),
            Err(PushError::Full(_)) => Err(AudioError::QueueFull),
        }
    }
}

#[cfg(feature = "rtrb")]
impl SynthesisEngine for GraphEngine {
    fn play_cue(&mut self, spec: &CueSpec) -> Result<(), AudioError> {
        // Allocate here, not on the audio thread
        let voice = build_voice(spec);
        self.send(AudioCommand::PlayCue(voice))
    }

    fn set_ambient_gain(&mut self, level: f32, seconds: f32) -> Result<(), AudioError> {
        self.send(AudioCommand::AmbientFade {
            level: level.clamp(0.0, 1.0),
            seconds,
        })
    }

    fn set_bus_volume(&mut self, bus: Bus, gain: f32) -> Result<(), AudioError> {
        self.send(AudioCommand::BusVolume {
            bus,
            gain: gain.max(0.0),
        })
    }
}

/// A sounding cue plus the gain used to fade it out if it is stolen.
#[cfg(feature = "rtrb")]
struct CueVoice {
    node: Box<dyn GraphNode>,
    level: Ramp,
}

#[cfg(feature = "rtrb")]
impl CueVoice {
    fn new(mut node: Box<dyn GraphNode>, ctx: &RenderCtx) -> Self {
        node.note_on(ctx);
        Self {
            node,
            level: Ramp::new(1.0),
        }
    }

    fn steal(&mut self) {
        self.level.ramp_to(0.0, STEAL_FADE_SECS, RampCurve::Linear);
    }

    fn is_stolen(&self) -> bool {
        self.level.target() == 0.0
    }

    fn is_finished(&self) -> bool {
        !self.node.is_active() || (self.is_stolen() && !self.level.is_ramping())
    }
}

/// Audio-side half of the graph engine: renders the ambient layer and the
/// live cue voices into a mono buffer.
#[cfg(feature = "rtrb")]
pub struct Mixer {
    rx: Consumer<AudioCommand>,
    ambient: AmbientLayer,
    ambient_level: Ramp,
    ambient_fade: Ramp,
    cue_level: Ramp,
    cues: Vec<CueVoice>,
    ambient_buffer: Vec<f32>,
    voice_buffer: Vec<f32>,
    cue_buffer: Vec<f32>,
}

#[cfg(feature = "rtrb")]
impl Mixer {
    fn new(settings: &AudioSettings, rx: Consumer<AudioCommand>) -> Self {
        Self {
            rx,
            ambient: AmbientLayer::default(),
            ambient_level: Ramp::new(settings.ambient_gain()),
            ambient_fade: Ramp::new(0.0),
            cue_level: Ramp::new(settings.cues_gain()),
            cues: Vec::with_capacity(MAX_CUE_VOICES * 2),
            ambient_buffer: vec![0.0; MAX_BLOCK_SIZE],
            voice_buffer: vec![0.0; MAX_BLOCK_SIZE],
            cue_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Render `out.len()` mono samples.
    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        let ctx = RenderCtx::new(sample_rate);
        self.process_commands(&ctx);

        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_block(block, &ctx);
        }
    }

    fn process_commands(&mut self, ctx: &RenderCtx) {
        while let Ok(command) = self.rx.pop() {
            match command {
                AudioCommand::PlayCue(voice) => self.start_cue(voice, ctx),
                AudioCommand::AmbientFade { level, seconds } => {
                    self.ambient_fade.ramp_to(level, seconds, RampCurve::Linear);
                }
                AudioCommand::BusVolume { bus, gain } => {
                    let target = match bus {
                        Bus::Ambient => &mut self.ambient_level,
                        Bus::Cues => &mut self.cue_level,
                    };
                    target.ramp_to(gain, VOLUME_SMOOTHING_SECS, RampCurve::Linear);
                }
            }
        }
    }

    fn start_cue(&mut self, voice: Box<dyn GraphNode>, ctx: &RenderCtx) {
        let sounding = self.cues.iter().filter(|cue| !cue.is_stolen()).count();
        if sounding >= MAX_CUE_VOICES {
            // Fade the oldest voice out instead of cutting it
            if let Some(oldest) = self.cues.iter_mut().find(|cue| !cue.is_stolen()) {
                oldest.steal();
            }
        }

        // A flood within one block can outrun the steal fade
        if self.cues.len() >= MAX_CUE_VOICES * 2 {
            self.cues.remove(0);
        }

        self.cues.push(CueVoice::new(voice, ctx));
    }

    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let len = out.len();

        let ambient = &mut self.ambient_buffer[..len];
        self.ambient.render_block(ambient, ctx);
        for (o, a) in out.iter_mut().zip(ambient.iter()) {
            let gain = self.ambient_level.next_sample(ctx.sample_rate)
                * self.ambient_fade.next_sample(ctx.sample_rate);
            *o = *a * gain;
        }

        let cue_mix = &mut self.cue_buffer[..len];
        cue_mix.fill(0.0);
        for voice in &mut self.cues {
            let frames = &mut self.voice_buffer[..len];
            voice.node.render_block(frames, ctx);
            for (c, v) in cue_mix.iter_mut().zip(frames.iter()) {
                *c += *v * voice.level.next_sample(ctx.sample_rate);
            }
        }
        // TODO: hand finished voices back to the control thread so they are
        // not deallocated inside the audio callback.
        self.cues.retain(|voice| !voice.is_finished());

        for (o, c) in out.iter_mut().zip(cue_mix.iter()) {
            *o += *c * self.cue_level.next_sample(ctx.sample_rate);
        }
    }

    /// Number of cue voices still sounding, not counting stolen voices
    /// that are fading out.
    pub fn active_cues(&self) -> usize {
        self.cues.iter().filter(|cue| !cue.is_stolen()).count()
    }

    /// Current ambient bus gain (volume × fade).
    pub fn ambient_gain(&self) -> f32 {
        self.ambient_level.value() * self.ambient_fade.value()
    }

    /// Current cue bus gain.
    pub fn cue_gain(&self) -> f32 {
        self.cue_level.value()
    }
}
