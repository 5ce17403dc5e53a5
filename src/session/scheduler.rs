use std::ops::ControlFlow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::session::phase::{Phase, BOX_PATTERN, PHASE_COUNT};

/*
Phase Scheduler
===============

A four-state loop driven by an explicit clock:

    ┌────────┐ 4 s ┌──────┐ 4 s ┌────────┐ 4 s ┌───────┐
    │ Inhale │ ──→ │ Hold │ ──→ │ Exhale │ ──→ │ Hold2 │ ─┐
    └────────┘     └──────┘     └────────┘     └───────┘  │
        ↑                                                 │
        └──────────────── cycle_count += 1 ───────────────┘

Nothing here sleeps or spawns. The owner calls `advance(dt_ms)` from whatever
loop it already has (a UI frame, a test) and every transition whose deadline
falls inside that step fires, in order, stamped with its exact deadline. A
coarse 100 ms tick therefore still reports Hold at 4000, not 4100.


Generations
-----------

Only one transition is ever pending. It remembers the generation that was
current when it was scheduled:

    start()   generation 1   pending { due: 4000, gen: 1 }
    stop()    generation 2   pending cleared
    start()   generation 3   pending { due: now + 4000, gen: 3 }

A transition whose generation no longer matches is stale and is dropped
without effect. Rapid start/stop toggling can never fire a leftover deadline
from an earlier session, skip a phase, or run two loops at once.


Stopping from a callback
------------------------

Observers get no handle back to the scheduler. `on_phase_enter` and
`on_cycle_complete` return `ControlFlow`; a `Break` stops the session right
after that dispatch and nothing later in the same `advance` fires.
*/

/// Snapshot of a session. Only the scheduler changes it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub running: bool,
    pub current_phase_index: usize,
    pub cycle_count: u32,
    pub sound_enabled: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            running: false,
            current_phase_index: 0,
            cycle_count: 0,
            sound_enabled: true,
        }
    }
}

/// Receives session events. Every method has a no-op default.
///
/// `at_ms` is the scheduler's virtual time at which the event happened.
pub trait SessionObserver {
    fn on_session_start(&mut self, _at_ms: u64) {}

    /// Return `ControlFlow::Break(())` to stop the session.
    fn on_phase_enter(&mut self, _phase: &Phase, _at_ms: u64) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Return `ControlFlow::Break(())` to stop the session.
    fn on_cycle_complete(&mut self, _cycle_count: u32, _at_ms: u64) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn on_session_stop(&mut self, _at_ms: u64) {}
}

/// Observer that ignores everything.
impl SessionObserver for () {}

#[derive(Debug, Clone, Copy)]
struct PendingTransition {
    due_ms: u64,
    generation: u64,
}

#[derive(Debug)]
pub struct PhaseScheduler {
    pattern: [Phase; PHASE_COUNT],
    state: SessionState,
    now_ms: u64,
    phase_entered_ms: u64,
    generation: u64,
    pending: Option<PendingTransition>,
}

impl PhaseScheduler {
    pub fn new() -> Self {
        Self {
            pattern: BOX_PATTERN,
            state: SessionState::default(),
            now_ms: 0,
            phase_entered_ms: 0,
            generation: 0,
            pending: None,
        }
    }

    /// Begin a session at the first phase. Does nothing while running.
    pub fn start(&mut self, observer: &mut dyn SessionObserver) {
        if self.state.running {
            debug!("start ignored, session already running");
            return;
        }

        self.generation = self.generation.wrapping_add(1);
        self.state.running = true;
        self.state.current_phase_index = 0;
        self.state.cycle_count = 0;
        info!(at_ms = self.now_ms, "session started");

        observer.on_session_start(self.now_ms);
        if self.enter_current(self.now_ms, observer).is_break() {
            self.stop(observer);
        }
    }

    /// End the session and cancel the pending transition. Does nothing while
    /// stopped.
    pub fn stop(&mut self, observer: &mut dyn SessionObserver) {
        if !self.state.running {
            return;
        }

        self.generation = self.generation.wrapping_add(1);
        self.pending = None;
        self.state.running = false;
        self.state.current_phase_index = 0;
        info!(
            at_ms = self.now_ms,
            cycles = self.state.cycle_count,
            "session stopped"
        );

        observer.on_session_stop(self.now_ms);
    }

    /// Move the clock forward by `dt_ms`, firing every transition that falls
    /// due. Returns how many transitions fired.
    pub fn advance(&mut self, dt_ms: u64, observer: &mut dyn SessionObserver) -> usize {
        let target = self.now_ms.saturating_add(dt_ms);
        let mut fired = 0;

        while let Some(pending) = self.pending {
            if pending.due_ms > target {
                break;
            }

            self.pending = None;
            self.now_ms = pending.due_ms;

            if !self.state.running || pending.generation != self.generation {
                debug!(due_ms = pending.due_ms, "dropping stale transition");
                continue;
            }

            fired += 1;
            if self.transition(pending.due_ms, observer).is_break() {
                debug!(at_ms = self.now_ms, "observer requested stop");
                self.stop(observer);
                break;
            }
        }

        self.now_ms = target;
        fired
    }

    fn transition(&mut self, at_ms: u64, observer: &mut dyn SessionObserver) -> ControlFlow<()> {
        let next = (self.state.current_phase_index + 1) % PHASE_COUNT;
        self.state.current_phase_index = next;

        if next == 0 {
            self.state.cycle_count = self.state.cycle_count.saturating_add(1);
            info!(cycles = self.state.cycle_count, at_ms, "cycle complete");
            observer.on_cycle_complete(self.state.cycle_count, at_ms)?;
        }

        self.enter_current(at_ms, observer)
    }

    fn enter_current(&mut self, at_ms: u64, observer: &mut dyn SessionObserver) -> ControlFlow<()> {
        let phase = self.pattern[self.state.current_phase_index];
        self.phase_entered_ms = at_ms;
        self.pending = Some(PendingTransition {
            due_ms: at_ms.saturating_add(phase.duration_ms),
            generation: self.generation,
        });
        debug!(phase = %phase.name, at_ms, "phase entered");

        observer.on_phase_enter(&phase, at_ms)
    }

    /// Virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn current_phase(&self) -> &Phase {
        &self.pattern[self.state.current_phase_index]
    }

    /// Milliseconds spent in the current phase; zero while stopped.
    pub fn phase_elapsed_ms(&self) -> u64 {
        if !self.state.running {
            return 0;
        }
        self.now_ms.saturating_sub(self.phase_entered_ms)
    }

    /// Fraction of the current phase that has elapsed, in `0.0..=1.0`.
    pub fn phase_progress(&self) -> f32 {
        let duration = self.current_phase().duration_ms;
        if duration == 0 {
            return 0.0;
        }
        (self.phase_elapsed_ms() as f32 / duration as f32).clamp(0.0, 1.0)
    }

    /// Record whether sound is enabled. Timing is unaffected.
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.state.sound_enabled = enabled;
    }

    /// Stop a running session and drop the scheduler.
    pub fn dispose(mut self, observer: &mut dyn SessionObserver) {
        self.stop(observer);
    }
}

impl Default for PhaseScheduler {
    fn default() -> Self {
        Self::new()
    }
}
