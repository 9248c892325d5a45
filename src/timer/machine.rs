//! Cycle state machine.
//!
//! Owns the mutable [`TimerState`] and the active [`Method`]. The state is
//! changed only through `start`, `stop`, `reset`, `switch_method` and
//! `tick`; everything else reads it through [`Snapshot`]s.
//!
//! ```text
//! Stopped ──start──▶ RunningWork ──expiry──▶ RunningBreak ──expiry──┐
//!    ▲                   │  ▲                     │                 │
//!    └──────stop─────────┘  └─────cycles left─────┘◀────────────────┘
//!                                                 │ last cycle
//!                                                 ▼
//!                                           CycleComplete ──start──▶ RunningWork
//! ```

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::types::{Method, Phase, Snapshot, TimerStatus};

use super::countdown;
use super::error::TimerError;

// ============================================================================
// TimerState
// ============================================================================

/// Mutable state of one timer session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    phase: Phase,
    running: bool,
    /// Anchor of the current phase; `None` while stopped.
    phase_start: Option<Instant>,
    remaining_seconds: u64,
    cycles_completed: u32,
    total_work_seconds: u64,
    total_break_seconds: u64,
}

impl TimerState {
    /// Fresh session state: stopped in Work with nothing accumulated.
    pub fn new() -> Self {
        Self {
            phase: Phase::Work,
            running: false,
            phase_start: None,
            remaining_seconds: 0,
            cycles_completed: 0,
            total_work_seconds: 0,
            total_break_seconds: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase_start(&self) -> Option<Instant> {
        self.phase_start
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    pub fn total_work_seconds(&self) -> u64 {
        self.total_work_seconds
    }

    pub fn total_break_seconds(&self) -> u64 {
        self.total_break_seconds
    }

    fn begin_phase(&mut self, phase: Phase, now: Instant, method: &Method) {
        self.phase = phase;
        self.phase_start = Some(now);
        self.remaining_seconds = method.phase_seconds(phase);
        self.running = true;
    }

    fn halt(&mut self) {
        self.running = false;
        self.phase_start = None;
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tick results
// ============================================================================

/// Emitted once per phase expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCompleteEvent {
    /// The phase that just ran out
    pub phase: Phase,
    /// Cycles completed after this expiry
    #[serde(rename = "cyclesCompleted")]
    pub cycles_completed: u32,
    /// True when this expiry finished the last cycle
    #[serde(rename = "sessionComplete")]
    pub session_complete: bool,
}

/// Result of a [`CycleMachine::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// State after the tick
    pub snapshot: Snapshot,
    /// Whether a phase expired during this tick
    pub transitioned: bool,
    /// Present exactly when `transitioned` is true
    pub notification: Option<PhaseCompleteEvent>,
}

impl TickOutcome {
    fn unchanged(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            transitioned: false,
            notification: None,
        }
    }
}

// ============================================================================
// CycleMachine
// ============================================================================

/// Work/Break cycle state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleMachine {
    method: Method,
    state: TimerState,
}

impl CycleMachine {
    /// Creates a stopped machine for `method`.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            state: TimerState::new(),
        }
    }

    /// Returns the active method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Derives the machine status from the state.
    pub fn status(&self) -> TimerStatus {
        match (self.state.running, self.state.phase) {
            (true, Phase::Work) => TimerStatus::RunningWork,
            (true, Phase::Break) => TimerStatus::RunningBreak,
            (false, _) if self.state.cycles_completed >= self.method.cycles() => {
                TimerStatus::CycleComplete
            }
            (false, _) => TimerStatus::Stopped,
        }
    }

    /// Returns a read-only copy of the observable state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.status(),
            phase: self.state.phase,
            running: self.state.running,
            remaining_seconds: self.state.remaining_seconds,
            cycles_completed: self.state.cycles_completed,
            total_work_seconds: self.state.total_work_seconds,
            total_break_seconds: self.state.total_break_seconds,
        }
    }

    /// Starts a Work phase at full duration.
    ///
    /// From `Stopped` the counters and totals are kept; there is no
    /// mid-phase resume, the phase restarts from its full length. From
    /// `CycleComplete` a new session begins with cleared counters.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidTransition`] if already running.
    pub fn start(&mut self, now: Instant) -> Result<Snapshot, TimerError> {
        match self.status() {
            status @ (TimerStatus::RunningWork | TimerStatus::RunningBreak) => {
                return Err(TimerError::InvalidTransition {
                    operation: "start",
                    status,
                });
            }
            TimerStatus::CycleComplete => self.state = TimerState::new(),
            TimerStatus::Stopped => {}
        }

        self.state.begin_phase(Phase::Work, now, &self.method);
        Ok(self.snapshot())
    }

    /// Stops the countdown, freezing the remaining time.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidTransition`] if not running.
    pub fn stop(&mut self) -> Result<Snapshot, TimerError> {
        if !self.state.running {
            return Err(TimerError::InvalidTransition {
                operation: "stop",
                status: self.status(),
            });
        }

        self.state.halt();
        Ok(self.snapshot())
    }

    /// Clears all progress. Valid from any status.
    pub fn reset(&mut self) -> Snapshot {
        self.state = TimerState::new();
        self.snapshot()
    }

    /// Resets, then adopts `method`. Does not start.
    pub fn switch_method(&mut self, method: Method) -> Snapshot {
        self.state = TimerState::new();
        self.method = method;
        self.snapshot()
    }

    /// Recomputes the remaining time at `now` and handles expiry.
    ///
    /// A no-op while not running. The first tick that sees zero remaining
    /// moves the phase reference to `now`, so later ticks measure against the
    /// new phase and cannot fire the same expiry again.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let phase_start = match self.state.phase_start {
            Some(start) if self.state.running => start,
            _ => return TickOutcome::unchanged(self.snapshot()),
        };

        let duration = self.method.phase_seconds(self.state.phase);
        self.state.remaining_seconds = countdown::remaining_at(now, phase_start, duration);
        if !countdown::is_expired(now, phase_start, duration) {
            return TickOutcome::unchanged(self.snapshot());
        }

        let completed = self.state.phase;
        let session_complete = match completed {
            Phase::Work => {
                self.state.total_work_seconds += self.method.work_seconds();
                self.state.begin_phase(Phase::Break, now, &self.method);
                false
            }
            Phase::Break => {
                self.state.total_break_seconds += self.method.break_seconds();
                self.state.cycles_completed += 1;
                if self.state.cycles_completed < self.method.cycles() {
                    self.state.begin_phase(Phase::Work, now, &self.method);
                    false
                } else {
                    self.state.halt();
                    true
                }
            }
        };

        TickOutcome {
            snapshot: self.snapshot(),
            transitioned: true,
            notification: Some(PhaseCompleteEvent {
                phase: completed,
                cycles_completed: self.state.cycles_completed,
                session_complete,
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn method(work: u32, brk: u32, cycles: u32) -> Method {
        Method::new(work, brk, cycles).unwrap()
    }

    // ------------------------------------------------------------------------
    // Lifecycle Tests
    // ------------------------------------------------------------------------

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn test_new_machine_is_stopped() {
            let machine = CycleMachine::new(Method::POMODORO);
            let snap = machine.snapshot();

            assert_eq!(snap.status, TimerStatus::Stopped);
            assert_eq!(snap.phase, Phase::Work);
            assert!(!snap.running);
            assert_eq!(snap.remaining_seconds, 0);
            assert_eq!(snap.cycles_completed, 0);
            assert!(machine.state().phase_start().is_none());
        }

        #[test]
        fn test_start_sets_full_work_duration() {
            let mut machine = CycleMachine::new(Method::POMODORO);
            let t0 = Instant::now();

            let snap = machine.start(t0).unwrap();

            assert_eq!(snap.status, TimerStatus::RunningWork);
            assert_eq!(snap.remaining_seconds, 1500);
            assert!(snap.running);
            assert_eq!(machine.state().phase_start(), Some(t0));
        }

        #[test]
        fn test_start_while_running_is_rejected() {
            let mut machine = CycleMachine::new(Method::POMODORO);
            let t0 = Instant::now();
            machine.start(t0).unwrap();
            machine.tick(t0 + secs(100));
            let before = machine.clone();

            let result = machine.start(t0 + secs(200));

            assert_eq!(
                result,
                Err(TimerError::InvalidTransition {
                    operation: "start",
                    status: TimerStatus::RunningWork
                })
            );
            assert_eq!(machine, before);
        }

        #[test]
        fn test_stop_freezes_remaining() {
            let mut machine = CycleMachine::new(Method::POMODORO);
            let t0 = Instant::now();
            machine.start(t0).unwrap();
            machine.tick(t0 + secs(600));

            let snap = machine.stop().unwrap();

            assert_eq!(snap.status, TimerStatus::Stopped);
            assert_eq!(snap.remaining_seconds, 900);
            assert!(machine.state().phase_start().is_none());

            // Time passing while stopped changes nothing.
            let outcome = machine.tick(t0 + secs(5000));
            assert!(!outcome.transitioned);
            assert_eq!(outcome.snapshot.remaining_seconds, 900);
        }

        #[test]
        fn test_stop_when_stopped_is_rejected() {
            let mut machine = CycleMachine::new(Method::POMODORO);
            assert!(matches!(
                machine.stop(),
                Err(TimerError::InvalidTransition {
                    operation: "stop",
                    status: TimerStatus::Stopped
                })
            ));
        }

        #[test]
        fn test_restart_after_stop_uses_full_duration() {
            let mut machine = CycleMachine::new(Method::POMODORO);
            let t0 = Instant::now();
            machine.start(t0).unwrap();
            machine.tick(t0 + secs(600));
            machine.stop().unwrap();
            assert_eq!(machine.snapshot().remaining_seconds, 900);

            let t1 = t0 + secs(2000);
            let snap = machine.start(t1).unwrap();

            assert_eq!(snap.phase, Phase::Work);
            assert_eq!(snap.remaining_seconds, 1500);
            assert_eq!(machine.tick(t1 + secs(1)).snapshot.remaining_seconds, 1499);
        }

        #[test]
        fn test_stop_keeps_counters() {
            let mut machine = CycleMachine::new(method(1, 1, 3));
            let t0 = Instant::now();
            machine.start(t0).unwrap();
            machine.tick(t0 + secs(60));
            machine.tick(t0 + secs(120));
            machine.stop().unwrap();

            let snap = machine.start(t0 + secs(500)).unwrap();
            assert_eq!(snap.cycles_completed, 1);
            assert_eq!(snap.total_work_seconds, 60);
            assert_eq!(snap.total_break_seconds, 60);
        }

        #[test]
        fn test_reset_clears_everything() {
            let mut machine = CycleMachine::new(method(1, 1, 3));
            let t0 = Instant::now();
            machine.start(t0).unwrap();
            machine.tick(t0 + secs(60));
            machine.tick(t0 + secs(90));

            let snap = machine.reset();

            assert_eq!(snap.status, TimerStatus::Stopped);
            assert_eq!(snap.phase, Phase::Work);
            assert_eq!(snap.remaining_seconds, 0);
            assert_eq!(snap.total_work_seconds, 0);
            assert_eq!(snap.total_break_seconds, 0);
            assert_eq!(snap.cycles_completed, 0);
        }

        #[test]
        fn test_switch_method_resets_and_does_not_start() {
            let mut machine = CycleMachine::new(Method::POMODORO);
            let t0 = Instant::now();
            machine.start(t0).unwrap();
            machine.tick(t0 + secs(1500));

            let snap = machine.switch_method(Method::SHORT_WORK);

            assert_eq!(snap.status, TimerStatus::Stopped);
            assert_eq!(snap.total_work_seconds, 0);
            assert_eq!(machine.method(), &Method::SHORT_WORK);

            let snap = machine.start(t0 + secs(2000)).unwrap();
            assert_eq!(snap.remaining_seconds, 900);
        }
    }

    // ------------------------------------------------------------------------
    // Tick Tests
    // ------------------------------------------------------------------------

    mod tick_tests {
        use super::*;

        #[test]
        fn test_tick_updates_remaining() {
            let mut machine = CycleMachine::new(Method::POMODORO);
            let t0 = Instant::now();
            machine.start(t0).unwrap();

            let outcome = machine.tick(t0 + Duration::from_millis(61_400));

            assert!(!outcome.transitioned);
            assert!(outcome.notification.is_none());
            assert_eq!(outcome.snapshot.remaining_seconds, 1439);
        }

        #[test]
        fn test_tick_is_idempotent_before_expiry() {
            let mut machine = CycleMachine::new(Method::POMODORO);
            let t0 = Instant::now();
            machine.start(t0).unwrap();

            let first = machine.tick(t0 + secs(42));
            let state_after_first = machine.clone();
            let second = machine.tick(t0 + secs(42));

            assert_eq!(first, second);
            assert_eq!(machine, state_after_first);
        }

        #[test]
        fn test_work_expiry_transitions_once() {
            let mut machine = CycleMachine::new(Method::POMODORO);
            let t0 = Instant::now();
            machine.start(t0).unwrap();
            let expiry = t0 + secs(1500);

            let first = machine.tick(expiry);
            let second = machine.tick(expiry);

            assert!(first.transitioned);
            assert_eq!(
                first.notification,
                Some(PhaseCompleteEvent {
                    phase: Phase::Work,
                    cycles_completed: 0,
                    session_complete: false
                })
            );
            assert_eq!(first.snapshot.status, TimerStatus::RunningBreak);
            assert_eq!(first.snapshot.remaining_seconds, 300);
            assert_eq!(first.snapshot.total_work_seconds, 1500);

            assert!(!second.transitioned);
            assert_eq!(second.snapshot.remaining_seconds, 300);
            assert_eq!(second.snapshot.total_work_seconds, 1500);
        }

        #[test]
        fn test_late_tick_starts_next_phase_at_tick_time() {
            let mut machine = CycleMachine::new(Method::POMODORO);
            let t0 = Instant::now();
            machine.start(t0).unwrap();

            let late = t0 + secs(1500 + 400);
            let outcome = machine.tick(late);

            // One transition only, even though the break would also be over.
            assert_eq!(outcome.snapshot.phase, Phase::Break);
            assert_eq!(outcome.snapshot.remaining_seconds, 300);
            assert_eq!(machine.state().phase_start(), Some(late));
        }

        #[test]
        fn test_single_cycle_runs_work_then_break() {
            let mut machine = CycleMachine::new(method(1, 1, 1));
            let t0 = Instant::now();
            machine.start(t0).unwrap();

            let work_done = machine.tick(t0 + secs(60));
            assert_eq!(work_done.snapshot.status, TimerStatus::RunningBreak);

            let break_done = machine.tick(t0 + secs(120));
            assert_eq!(break_done.snapshot.status, TimerStatus::CycleComplete);
            assert_eq!(break_done.snapshot.cycles_completed, 1);
            assert_eq!(
                break_done.notification,
                Some(PhaseCompleteEvent {
                    phase: Phase::Break,
                    cycles_completed: 1,
                    session_complete: true
                })
            );
        }

        #[test]
        fn test_tick_after_completion_is_noop() {
            let mut machine = CycleMachine::new(method(1, 1, 1));
            let t0 = Instant::now();
            machine.start(t0).unwrap();
            machine.tick(t0 + secs(60));
            machine.tick(t0 + secs(120));
            let done = machine.clone();

            let outcome = machine.tick(t0 + secs(10_000));

            assert!(!outcome.transitioned);
            assert_eq!(machine, done);
            assert!(!outcome.snapshot.running);
        }

        #[test]
        fn test_start_after_completion_begins_new_session() {
            let mut machine = CycleMachine::new(method(1, 1, 1));
            let t0 = Instant::now();
            machine.start(t0).unwrap();
            machine.tick(t0 + secs(60));
            machine.tick(t0 + secs(120));

            let snap = machine.start(t0 + secs(200)).unwrap();

            assert_eq!(snap.status, TimerStatus::RunningWork);
            assert_eq!(snap.cycles_completed, 0);
            assert_eq!(snap.total_work_seconds, 0);
        }

        #[test]
        fn test_remaining_never_exceeds_phase_duration() {
            let mut machine = CycleMachine::new(method(2, 1, 2));
            let t0 = Instant::now();
            machine.start(t0).unwrap();

            for s in (0..600).step_by(7) {
                let snap = machine.tick(t0 + secs(s)).snapshot;
                let limit = machine.method().phase_seconds(snap.phase);
                assert!(snap.remaining_seconds <= limit);
                assert!(snap.cycles_completed <= machine.method().cycles());
            }
        }
    }
}
