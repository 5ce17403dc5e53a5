use std::ops::ControlFlow;

use tracing::{debug, info, warn};

use crate::{
    config::{clamp_volume, AudioSettings, AMBIENT_FADE_IN_SECS, AMBIENT_FADE_OUT_SECS},
    cue::engine::{Bus, NullEngine, SynthesisEngine},
    error::AudioError,
    session::{phase::Phase, scheduler::SessionObserver},
};

/// Turns phase changes into sound.
///
/// Owns the engine handle, the bus volumes, the mute flag and whether the
/// ambient layer is supposed to be playing. Nothing here ever blocks or
/// propagates an audio failure: a broken engine degrades to silence and the
/// session keeps its timing.
pub struct CueSynthesizer {
    engine: Box<dyn SynthesisEngine>,
    settings: AudioSettings,
    ambient_playing: bool,
}

impl CueSynthesizer {
    /// A silent synthesizer. Call `initialize_audio` to attach a real engine.
    pub fn new(settings: AudioSettings) -> Self {
        let settings = AudioSettings::new()
            .with_ambient_volume(settings.ambient_volume)
            .with_cues_volume(settings.cues_volume)
            .with_sound_enabled(settings.sound_enabled);

        Self {
            engine: Box::new(NullEngine),
            settings,
            ambient_playing: false,
        }
    }

    /// Open the audio backend with `open`.
    ///
    /// Does nothing once a live engine is attached. On failure the silent
    /// engine stays in place and a later call may try again. Returns whether
    /// live audio is available.
    pub fn initialize_audio<F>(&mut self, open: F) -> bool
    where
        F: FnOnce(&AudioSettings) -> Result<Box<dyn SynthesisEngine>, AudioError>,
    {
        if self.engine.is_live() {
            return true;
        }

        match open(&self.settings) {
            Ok(engine) => {
                self.engine = engine;
                info!(live = self.engine.is_live(), "audio initialized");

                if self.ambient_playing && self.settings.sound_enabled {
                    self.fade_ambient(1.0, AMBIENT_FADE_IN_SECS);
                }
                self.engine.is_live()
            }
            Err(err) => {
                warn!(error = %err, "audio unavailable, continuing without sound");
                false
            }
        }
    }

    /// Play the cue for `phase` unless sound is disabled.
    pub fn play_phase_cue(&mut self, phase: &Phase) {
        if !self.settings.sound_enabled {
            return;
        }

        let result = self.engine.play_cue(&phase.cue);
        self.check("cue", result);
    }

    /// Fade the ambient layer in. Calling it again while playing does nothing.
    pub fn play_ambient(&mut self) {
        if self.ambient_playing {
            return;
        }

        self.ambient_playing = true;
        if self.settings.sound_enabled {
            self.fade_ambient(1.0, AMBIENT_FADE_IN_SECS);
        }
    }

    /// Fade the ambient layer out. Calling it again while stopped does nothing.
    pub fn stop_ambient(&mut self) {
        if !self.ambient_playing {
            return;
        }

        self.ambient_playing = false;
        self.fade_ambient(0.0, AMBIENT_FADE_OUT_SECS);
    }

    /// Suppress or restore sound.
    ///
    /// A playing ambient layer fades to or from silence; its oscillators keep
    /// running so unmuting resumes where the sound would have been.
    pub fn set_muted(&mut self, muted: bool) {
        let enabled = !muted;
        if self.settings.sound_enabled == enabled {
            return;
        }

        self.settings.sound_enabled = enabled;
        info!(muted, "sound toggled");

        if self.ambient_playing {
            if muted {
                self.fade_ambient(0.0, AMBIENT_FADE_OUT_SECS);
            } else {
                self.fade_ambient(1.0, AMBIENT_FADE_IN_SECS);
            }
        }
    }

    pub fn set_ambient_volume(&mut self, percent: f32) {
        self.settings.ambient_volume = clamped("ambient", percent);
        let result = self
            .engine
            .set_bus_volume(Bus::Ambient, self.settings.ambient_gain());
        self.check("ambient volume", result);
    }

    pub fn set_cues_volume(&mut self, percent: f32) {
        self.settings.cues_volume = clamped("cues", percent);
        let result = self
            .engine
            .set_bus_volume(Bus::Cues, self.settings.cues_gain());
        self.check("cues volume", result);
    }

    pub fn is_muted(&self) -> bool {
        !self.settings.sound_enabled
    }

    pub fn is_ambient_playing(&self) -> bool {
        self.ambient_playing
    }

    /// True when a real audio engine is attached.
    pub fn is_live(&self) -> bool {
        self.engine.is_live()
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    /// Fade out and release the engine.
    pub fn dispose(mut self) {
        self.stop_ambient();
        debug!("synthesizer disposed");
    }

    fn fade_ambient(&mut self, level: f32, seconds: f32) {
        let result = self.engine.set_ambient_gain(level, seconds);
        self.check("ambient fade", result);
    }

    fn check(&mut self, what: &'static str, result: Result<(), AudioError>) {
        match result {
            Ok(()) => {}
            Err(AudioError::QueueFull) => {
                debug!(what, "audio queue full, command dropped");
            }
            Err(AudioError::Disconnected) => {
                warn!(what, "audio output went away, continuing without sound");
                self.engine = Box::new(NullEngine);
            }
            Err(err) => {
                warn!(what, error = %err, "audio command failed");
            }
        }
    }
}

impl Default for CueSynthesizer {
    fn default() -> Self {
        Self::new(AudioSettings::default())
    }
}

fn clamped(bus: &'static str, percent: f32) -> f32 {
    let volume = clamp_volume(percent);
    if volume != percent {
        warn!(bus, requested = percent, applied = volume, "volume out of range");
    }
    volume
}

impl SessionObserver for CueSynthesizer {
    fn on_session_start(&mut self, _at_ms: u64) {
        self.play_ambient();
    }

    fn on_phase_enter(&mut self, phase: &Phase, _at_ms: u64) -> ControlFlow<()> {
        self.play_phase_cue(phase);
        ControlFlow::Continue(())
    }

    fn on_session_stop(&mut self, _at_ms: u64) {
        self.stop_ambient();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{cue::spec::CueSpec, session::phase::BOX_PATTERN};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Cue(CueSpec),
        Ambient(f32, f32),
        Volume(Bus, f32),
    }

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<Call>>>,
        fail_with_full: bool,
    }

    impl Recorder {
        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn open(
            &self,
        ) -> impl FnOnce(&AudioSettings) -> Result<Box<dyn SynthesisEngine>, AudioError> {
            let engine = self.clone();
            move |_: &AudioSettings| Ok(Box::new(engine) as Box<dyn SynthesisEngine>)
        }
    }

    impl SynthesisEngine for Recorder {
        fn play_cue(&mut self, spec: &CueSpec) -> Result<(), AudioError> {
            if self.fail_with_full {
                return Err(AudioError::QueueFull);
            }
            self.calls.borrow_mut().push(Call::Cue(*spec));
            Ok(())
        }

        fn set_ambient_gain(&mut self, level: f32, seconds: f32) -> Result<(), AudioError> {
            self.calls.borrow_mut().push(Call::Ambient(level, seconds));
            Ok(())
        }

        fn set_bus_volume(&mut self, bus: Bus, gain: f32) -> Result<(), AudioError> {
            self.calls.borrow_mut().push(Call::Volume(bus, gain));
            Ok(())
        }
    }

    fn live_synth() -> (CueSynthesizer, Recorder) {
        let recorder = Recorder::default();
        let mut synth = CueSynthesizer::default();
        assert!(synth.initialize_audio(recorder.open()));
        (synth, recorder)
    }

    #[test]
    fn plays_one_cue_per_phase() {
        let (mut synth, recorder) = live_synth();
        for phase in BOX_PATTERN.iter() {
            synth.play_phase_cue(phase);
        }

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Cue(CueSpec::INHALE),
                Call::Cue(CueSpec::HOLD),
                Call::Cue(CueSpec::EXHALE),
                Call::Cue(CueSpec::HOLD),
            ]
        );
    }

    #[test]
    fn muted_synth_plays_no_cues() {
        let (mut synth, recorder) = live_synth();
        synth.set_muted(true);
        synth.play_phase_cue(&BOX_PATTERN[0]);

        assert!(recorder.calls().is_empty());
        assert!(synth.is_muted());
    }

    #[test]
    fn ambient_start_and_stop_are_idempotent() {
        let (mut synth, recorder) = live_synth();
        synth.play_ambient();
        synth.play_ambient();
        synth.stop_ambient();
        synth.stop_ambient();

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Ambient(1.0, AMBIENT_FADE_IN_SECS),
                Call::Ambient(0.0, AMBIENT_FADE_OUT_SECS),
            ]
        );
    }

    #[test]
    fn mute_fades_playing_ambient() {
        let (mut synth, recorder) = live_synth();
        synth.play_ambient();
        synth.set_muted(true);
        synth.set_muted(true);
        synth.set_muted(false);

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Ambient(1.0, AMBIENT_FADE_IN_SECS),
                Call::Ambient(0.0, AMBIENT_FADE_OUT_SECS),
                Call::Ambient(1.0, AMBIENT_FADE_IN_SECS),
            ]
        );
        assert!(synth.is_ambient_playing());
    }

    #[test]
    fn muted_start_keeps_ambient_silent() {
        let (mut synth, recorder) = live_synth();
        synth.set_muted(true);
        synth.play_ambient();

        assert!(recorder.calls().is_empty());
        assert!(synth.is_ambient_playing());
    }

    #[test]
    fn volume_is_clamped_before_the_ceiling() {
        let (mut synth, recorder) = live_synth();
        synth.set_cues_volume(250.0);
        synth.set_ambient_volume(-5.0);

        assert_eq!(synth.settings().cues_volume, 100.0);
        assert_eq!(synth.settings().ambient_volume, 0.0);
        assert_eq!(
            recorder.calls(),
            vec![Call::Volume(Bus::Cues, 0.7), Call::Volume(Bus::Ambient, 0.0)]
        );
    }

    #[test]
    fn failed_open_falls_back_and_allows_retry() {
        let mut synth = CueSynthesizer::default();
        assert!(!synth.initialize_audio(|_| Err(AudioError::NoOutputDevice)));
        assert!(!synth.is_live());

        // Silent engine still accepts everything
        synth.play_ambient();
        synth.play_phase_cue(&BOX_PATTERN[0]);

        let recorder = Recorder::default();
        assert!(synth.initialize_audio(recorder.open()));
        assert_eq!(recorder.calls(), vec![Call::Ambient(1.0, AMBIENT_FADE_IN_SECS)]);
    }

    #[test]
    fn second_initialize_keeps_the_first_engine() {
        let (mut synth, _first) = live_synth();
        let mut opened = false;
        assert!(synth.initialize_audio(|_| {
            opened = true;
            Err(AudioError::NoOutputDevice)
        }));
        assert!(!opened);
    }

    #[test]
    fn full_queue_drops_the_cue() {
        let recorder = Recorder {
            fail_with_full: true,
            ..Recorder::default()
        };
        let mut synth = CueSynthesizer::default();
        synth.initialize_audio(recorder.open());

        synth.play_phase_cue(&BOX_PATTERN[0]);
        assert!(recorder.calls().is_empty());
        assert!(synth.is_live());
    }
}
