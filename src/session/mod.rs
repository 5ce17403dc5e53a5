//! Breathing session: the phase state machine plus the facade that wires it
//! to the synthesizer and any number of extra observers.

/// Phase names, durations and the box pattern.
pub mod phase;
/// Clock-driven phase state machine.
pub mod scheduler;

use std::ops::ControlFlow;

use tracing::info;

pub use phase::{Phase, PhaseName, BOX_PATTERN};
pub use scheduler::{PhaseScheduler, SessionObserver, SessionState};

use crate::{
    config::AudioSettings,
    cue::{engine::SynthesisEngine, synth::CueSynthesizer},
    error::AudioError,
};

/// Owns one scheduler and one synthesizer.
///
/// Lifecycle: `new` → (`start` / `stop` / `advance`)* → `dispose`. The
/// synthesizer hears start and stop before the extra observers do. Phase cues
/// are played once per call, for the last phase entered: an `advance` that
/// catches up over several transitions still reports each one to the
/// observers at its deadline, but only the current phase is heard.
pub struct BreathingSession {
    scheduler: PhaseScheduler,
    synth: CueSynthesizer,
    observers: Vec<Box<dyn SessionObserver>>,
}

/// Dispatches one event to the synthesizer and then every observer.
///
/// Phase entries are held back from the synthesizer in `pending_cue` until the
/// scheduler call returns, so a batch of overdue transitions plays one cue.
struct Fanout<'a> {
    synth: &'a mut CueSynthesizer,
    observers: &'a mut [Box<dyn SessionObserver>],
    pending_cue: Option<Phase>,
}

impl<'a> Fanout<'a> {
    fn new(synth: &'a mut CueSynthesizer, observers: &'a mut [Box<dyn SessionObserver>]) -> Self {
        Self {
            synth,
            observers,
            pending_cue: None,
        }
    }

    fn play_pending_cue(self) {
        if let Some(phase) = self.pending_cue {
            self.synth.play_phase_cue(&phase);
        }
    }
}

impl SessionObserver for Fanout<'_> {
    fn on_session_start(&mut self, at_ms: u64) {
        self.synth.on_session_start(at_ms);
        for observer in self.observers.iter_mut() {
            observer.on_session_start(at_ms);
        }
    }

    fn on_phase_enter(&mut self, phase: &Phase, at_ms: u64) -> ControlFlow<()> {
        self.pending_cue = Some(*phase);

        let mut flow = ControlFlow::Continue(());
        for observer in self.observers.iter_mut() {
            if observer.on_phase_enter(phase, at_ms).is_break() {
                flow = ControlFlow::Break(());
            }
        }
        flow
    }

    fn on_cycle_complete(&mut self, cycle_count: u32, at_ms: u64) -> ControlFlow<()> {
        let mut flow = self.synth.on_cycle_complete(cycle_count, at_ms);
        for observer in self.observers.iter_mut() {
            if observer.on_cycle_complete(cycle_count, at_ms).is_break() {
                flow = ControlFlow::Break(());
            }
        }
        flow
    }

    fn on_session_stop(&mut self, at_ms: u64) {
        self.pending_cue = None;
        self.synth.on_session_stop(at_ms);
        for observer in self.observers.iter_mut() {
            observer.on_session_stop(at_ms);
        }
    }
}

impl BreathingSession {
    pub fn new(settings: AudioSettings) -> Self {
        let mut scheduler = PhaseScheduler::new();
        scheduler.set_sound_enabled(settings.sound_enabled);

        Self {
            scheduler,
            synth: CueSynthesizer::new(settings),
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn with_observer(mut self, observer: impl SessionObserver + 'static) -> Self {
        self.add_observer(Box::new(observer));
        self
    }

    /// See [`CueSynthesizer::initialize_audio`].
    pub fn initialize_audio<F>(&mut self, open: F) -> bool
    where
        F: FnOnce(&AudioSettings) -> Result<Box<dyn SynthesisEngine>, AudioError>,
    {
        self.synth.initialize_audio(open)
    }

    pub fn start(&mut self) {
        let mut fanout = Fanout::new(&mut self.synth, &mut self.observers);
        self.scheduler.start(&mut fanout);
        fanout.play_pending_cue();
    }

    pub fn stop(&mut self) {
        let mut fanout = Fanout::new(&mut self.synth, &mut self.observers);
        self.scheduler.stop(&mut fanout);
    }

    /// Start when stopped, stop when running.
    pub fn toggle(&mut self) {
        if self.scheduler.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Move session time forward. Returns how many transitions fired.
    pub fn advance(&mut self, dt_ms: u64) -> usize {
        let mut fanout = Fanout::new(&mut self.synth, &mut self.observers);
        let fired = self.scheduler.advance(dt_ms, &mut fanout);
        fanout.play_pending_cue();
        fired
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.scheduler.set_sound_enabled(enabled);
        self.synth.set_muted(!enabled);
    }

    pub fn set_ambient_volume(&mut self, percent: f32) {
        self.synth.set_ambient_volume(percent);
    }

    pub fn set_cues_volume(&mut self, percent: f32) {
        self.synth.set_cues_volume(percent);
    }

    pub fn scheduler(&self) -> &PhaseScheduler {
        &self.scheduler
    }

    pub fn synthesizer(&self) -> &CueSynthesizer {
        &self.synth
    }

    pub fn state(&self) -> &SessionState {
        self.scheduler.state()
    }

    /// Stop anything still running and release audio.
    pub fn dispose(mut self) {
        self.stop();
        info!(cycles = self.scheduler.state().cycle_count, "session disposed");

        let Self {
            scheduler, synth, ..
        } = self;
        scheduler.dispose(&mut ());
        synth.dispose();
    }
}

impl Default for BreathingSession {
    fn default() -> Self {
        Self::new(AudioSettings::default())
    }
}
