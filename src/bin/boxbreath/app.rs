//! Event loop: keys in, session time forward, frame out.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use cpal::Stream;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use tracing::info;

use boxbreath::{config::AMBIENT_FADE_OUT_SECS, cue::SynthesisEngine, BreathingSession};

use super::{output, ui};

/// Volume change per key press, in percent.
const VOLUME_STEP: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioStatus {
    /// `--no-audio`
    Disabled,
    /// Opened on the first start
    Pending,
    Live,
    Unavailable,
}

pub struct App {
    session: BreathingSession,
    audio: AudioStatus,
    stream: Option<Stream>,
    last_tick: Instant,
    should_quit: bool,
}

impl App {
    pub fn new(session: BreathingSession, audio_enabled: bool) -> Self {
        Self {
            session,
            audio: if audio_enabled {
                AudioStatus::Pending
            } else {
                AudioStatus::Disabled
            },
            stream: None,
            last_tick: Instant::now(),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.last_tick = Instant::now();

        while !self.should_quit {
            self.tick();

            terminal.draw(|frame| ui::render(frame, &self.session, self.audio))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Stop a running session and close audio.
    ///
    /// Keeps the output stream open until the ambient fade-out has played.
    pub fn shutdown(self) {
        let Self {
            session,
            audio,
            stream,
            ..
        } = self;
        let synth = session.synthesizer();
        let grace = fade_out_grace(audio, synth.is_ambient_playing() && !synth.is_muted());

        session.dispose();
        if !grace.is_zero() {
            info!(?grace, "waiting for the ambient fade-out");
            std::thread::sleep(grace);
        }
        drop(stream);
    }

    /// Feed whole elapsed milliseconds to the session; the remainder carries
    /// into the next tick.
    fn tick(&mut self) {
        let elapsed = self.last_tick.elapsed();
        let whole_ms = elapsed.as_millis() as u64;
        if whole_ms == 0 {
            return;
        }

        self.last_tick += Duration::from_millis(whole_ms);
        self.session.advance(whole_ms);
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                if !self.session.state().running {
                    self.ensure_audio();
                }
                self.session.toggle();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                let enabled = self.session.state().sound_enabled;
                self.session.set_sound_enabled(!enabled);
            }
            KeyCode::Char('[') => self.nudge_ambient(-VOLUME_STEP),
            KeyCode::Char(']') => self.nudge_ambient(VOLUME_STEP),
            KeyCode::Char('-') => self.nudge_cues(-VOLUME_STEP),
            KeyCode::Char('=') | KeyCode::Char('+') => self.nudge_cues(VOLUME_STEP),
            _ => {}
        }
    }

    fn nudge_ambient(&mut self, delta: f32) {
        let volume = self.session.synthesizer().settings().ambient_volume;
        self.session
            .set_ambient_volume((volume + delta).clamp(0.0, 100.0));
    }

    fn nudge_cues(&mut self, delta: f32) {
        let volume = self.session.synthesizer().settings().cues_volume;
        self.session
            .set_cues_volume((volume + delta).clamp(0.0, 100.0));
    }

    /// Open the output device the first time a session starts.
    fn ensure_audio(&mut self) {
        if self.audio != AudioStatus::Pending {
            return;
        }

        let mut stream = None;
        let live = self.session.initialize_audio(|settings| {
            let (engine, opened) = output::open(settings)?;
            stream = Some(opened);
            Ok(Box::new(engine) as Box<dyn SynthesisEngine>)
        });

        self.stream = stream;
        self.audio = if live {
            AudioStatus::Live
        } else {
            AudioStatus::Unavailable
        };
        info!(status = ?self.audio, "audio setup finished");
    }
}

/// How long the stream must outlive `dispose` for the ambient fade to finish.
fn fade_out_grace(audio: AudioStatus, ambient_audible: bool) -> Duration {
    if audio == AudioStatus::Live && ambient_audible {
        Duration::from_secs_f32(AMBIENT_FADE_OUT_SECS)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_ambient_gets_its_fade_out() {
        assert_eq!(
            fade_out_grace(AudioStatus::Live, true),
            Duration::from_secs_f32(AMBIENT_FADE_OUT_SECS)
        );
    }

    #[test]
    fn nothing_to_wait_for_without_audible_ambient() {
        assert!(fade_out_grace(AudioStatus::Live, false).is_zero());
        assert!(fade_out_grace(AudioStatus::Pending, true).is_zero());
        assert!(fade_out_grace(AudioStatus::Unavailable, true).is_zero());
        assert!(fade_out_grace(AudioStatus::Disabled, true).is_zero());
    }

    #[test]
    fn stopped_app_shuts_down_without_waiting() {
        let app = App::new(BreathingSession::default(), false);
        let started = Instant::now();
        app.shutdown();
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
