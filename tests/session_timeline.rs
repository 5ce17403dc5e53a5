use std::{cell::RefCell, ops::ControlFlow, rc::Rc};

use boxbreath::{
    config::AudioSettings,
    cue::{Bus, CueSpec, SynthesisEngine},
    AudioError, BreathingSession, Phase, PhaseName, PhaseScheduler, SessionObserver,
};
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Enter(PhaseName, u64),
    Cycle(u32, u64),
    Stop(u64),
}

#[derive(Clone, Default)]
struct Timeline(Rc<RefCell<Vec<Event>>>);

impl Timeline {
    fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    fn entered(&self) -> Vec<PhaseName> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Enter(name, _) => Some(name),
                _ => None,
            })
            .collect()
    }
}

impl SessionObserver for Timeline {
    fn on_phase_enter(&mut self, phase: &Phase, at_ms: u64) -> ControlFlow<()> {
        self.0.borrow_mut().push(Event::Enter(phase.name, at_ms));
        ControlFlow::Continue(())
    }

    fn on_cycle_complete(&mut self, cycle_count: u32, at_ms: u64) -> ControlFlow<()> {
        self.0.borrow_mut().push(Event::Cycle(cycle_count, at_ms));
        ControlFlow::Continue(())
    }

    fn on_session_stop(&mut self, at_ms: u64) {
        self.0.borrow_mut().push(Event::Stop(at_ms));
    }
}

/// Counts cues that reach the engine.
#[derive(Clone, Default)]
struct CueCounter(Rc<RefCell<Vec<CueSpec>>>);

impl SynthesisEngine for CueCounter {
    fn play_cue(&mut self, spec: &CueSpec) -> Result<(), AudioError> {
        self.0.borrow_mut().push(*spec);
        Ok(())
    }

    fn set_ambient_gain(&mut self, _level: f32, _seconds: f32) -> Result<(), AudioError> {
        Ok(())
    }

    fn set_bus_volume(&mut self, _bus: Bus, _gain: f32) -> Result<(), AudioError> {
        Ok(())
    }
}

fn session_with_timeline(settings: AudioSettings) -> (BreathingSession, Timeline) {
    let timeline = Timeline::default();
    let session = BreathingSession::new(settings).with_observer(timeline.clone());
    (session, timeline)
}

#[test]
fn first_cycle_matches_the_box_timeline() {
    let (mut session, timeline) = session_with_timeline(AudioSettings::default());
    session.start();
    for _ in 0..16 {
        session.advance(1_000);
    }

    assert_eq!(
        timeline.events(),
        vec![
            Event::Enter(PhaseName::Inhale, 0),
            Event::Enter(PhaseName::Hold, 4_000),
            Event::Enter(PhaseName::Exhale, 8_000),
            Event::Enter(PhaseName::Hold2, 12_000),
            Event::Cycle(1, 16_000),
            Event::Enter(PhaseName::Inhale, 16_000),
        ]
    );
    assert_eq!(session.state().cycle_count, 1);
}

#[test]
fn stop_mid_hold_cancels_the_exhale() {
    let (mut session, timeline) = session_with_timeline(AudioSettings::default());
    session.start();
    session.advance(6_000);
    session.stop();
    session.advance(10_000);

    assert_eq!(
        timeline.events(),
        vec![
            Event::Enter(PhaseName::Inhale, 0),
            Event::Enter(PhaseName::Hold, 4_000),
            Event::Stop(6_000),
        ]
    );
}

#[test]
fn start_many_times_is_one_session() {
    let (mut session, timeline) = session_with_timeline(AudioSettings::default());
    for _ in 0..5 {
        session.start();
    }
    let once = *session.state();
    session.advance(4_000);

    assert!(once.running);
    assert_eq!(once.current_phase_index, 0);
    assert_eq!(
        timeline.entered(),
        vec![PhaseName::Inhale, PhaseName::Hold]
    );
}

#[test]
fn muting_changes_sound_not_timing() {
    let cues = CueCounter::default();
    let (mut session, timeline) = session_with_timeline(AudioSettings::default());
    let engine = cues.clone();
    assert!(session.initialize_audio(move |_| Ok(Box::new(engine) as Box<dyn SynthesisEngine>)));

    session.start();
    session.advance(4_000);
    session.set_sound_enabled(false);
    session.advance(8_000);
    session.set_sound_enabled(true);
    session.advance(4_000);

    assert_eq!(
        timeline.entered(),
        vec![
            PhaseName::Inhale,
            PhaseName::Hold,
            PhaseName::Exhale,
            PhaseName::Hold2,
            PhaseName::Inhale,
        ]
    );
    // Exhale and the second hold were entered while muted
    assert_eq!(
        *cues.0.borrow(),
        vec![CueSpec::INHALE, CueSpec::HOLD, CueSpec::INHALE]
    );
}

#[test]
fn session_runs_without_audio() {
    let (mut session, timeline) = session_with_timeline(AudioSettings::default());
    assert!(!session.initialize_audio(|_| Err(AudioError::NoOutputDevice)));

    session.start();
    session.advance(16_000);

    assert_eq!(timeline.entered().len(), 5);
    assert!(!session.synthesizer().is_live());
}

#[derive(Debug, Clone)]
enum Action {
    Start,
    Stop,
    Advance(u64),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        1 => Just(Action::Start),
        1 => Just(Action::Stop),
        4 => (0u64..20_000).prop_map(Action::Advance),
    ]
}

const ORDER: [PhaseName; 4] = [
    PhaseName::Inhale,
    PhaseName::Hold,
    PhaseName::Exhale,
    PhaseName::Hold2,
];

proptest! {
    #[test]
    fn phases_never_skip_or_reorder(actions in prop::collection::vec(action(), 1..60)) {
        let mut scheduler = PhaseScheduler::new();
        let mut timeline = Timeline::default();

        for action in &actions {
            match action {
                Action::Start => scheduler.start(&mut timeline),
                Action::Stop => scheduler.stop(&mut timeline),
                Action::Advance(ms) => {
                    scheduler.advance(*ms, &mut timeline);
                }
            }
        }

        // Within a session, entries follow the cyclic order from Inhale and
        // are spaced exactly one phase apart.
        let mut expected = 0usize;
        let mut last_at: Option<u64> = None;
        for event in timeline.events() {
            match event {
                Event::Enter(name, at_ms) => {
                    if name == PhaseName::Inhale && last_at.is_none() {
                        expected = 0;
                    }
                    prop_assert_eq!(name, ORDER[expected]);
                    if let Some(previous) = last_at {
                        prop_assert_eq!(at_ms - previous, 4_000);
                    }
                    expected = (expected + 1) % ORDER.len();
                    last_at = Some(at_ms);
                }
                Event::Stop(_) => {
                    expected = 0;
                    last_at = None;
                }
                Event::Cycle(_, _) => {}
            }
        }

        let state = scheduler.state();
        prop_assert!(state.current_phase_index < ORDER.len());
        if !state.running {
            prop_assert_eq!(state.current_phase_index, 0);
        }
    }
}
