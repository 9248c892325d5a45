//! End-to-End Tests for the Pomocycle timer.
//!
//! These tests walk complete sessions through the engine on a manual clock:
//! - A full two-cycle session with phase-by-phase totals
//! - Invalid configuration leaving the engine untouched
//! - Stop mid-phase, then restart at full duration
//! - Late polls transitioning exactly once
//! - Session completion and a fresh restart afterwards

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use pomocycle::daemon::timer::{TimerEngine, TimerEvent};
use pomocycle::timer::{ManualClock, TimerError};
use pomocycle::types::{CustomValues, MethodName, Phase, TimerStatus};

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates an engine on a manual clock with the given custom method.
fn create_engine(
    values: CustomValues,
) -> (
    TimerEngine,
    Arc<ManualClock>,
    mpsc::UnboundedReceiver<TimerEvent>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let clock = Arc::new(ManualClock::new());
    let mut engine = TimerEngine::with_clock(clock.clone(), tx);
    engine.configure(MethodName::Custom, Some(values)).unwrap();
    (engine, clock, rx)
}

/// Collects every pending event except ticks.
fn drain(rx: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<TimerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if !matches!(event, TimerEvent::Tick { .. }) {
            events.push(event);
        }
    }
    events
}

// ============================================================================
// Full Session
// ============================================================================

/// Two cycles of 25/5: every phase boundary, every total.
#[test]
fn test_complete_two_cycle_session() {
    let (mut engine, clock, mut rx) = create_engine(CustomValues::new(25, 5, 2));
    drain(&mut rx);

    let snap = engine.start().unwrap();
    assert_eq!(snap.phase, Phase::Work);
    assert_eq!(snap.remaining_seconds, 1500);

    clock.advance_secs(1500);
    let snap = engine.tick().snapshot;
    assert_eq!(snap.phase, Phase::Break);
    assert_eq!(snap.remaining_seconds, 300);
    assert_eq!(snap.total_work_seconds, 1500);

    clock.advance_secs(300);
    let snap = engine.tick().snapshot;
    assert_eq!(snap.phase, Phase::Work);
    assert_eq!(snap.remaining_seconds, 1500);
    assert_eq!(snap.cycles_completed, 1);
    assert_eq!(snap.total_break_seconds, 300);

    clock.advance_secs(1500);
    let snap = engine.tick().snapshot;
    assert_eq!(snap.phase, Phase::Break);
    assert_eq!(snap.remaining_seconds, 300);

    clock.advance_secs(300);
    let snap = engine.tick().snapshot;
    assert_eq!(snap.status, TimerStatus::CycleComplete);
    assert_eq!(snap.cycles_completed, 2);
    assert!(!snap.running);
    assert_eq!(snap.total_work_seconds, 3000);
    assert_eq!(snap.total_break_seconds, 600);

    let events = drain(&mut rx);
    assert_eq!(
        events.last(),
        Some(&TimerEvent::SessionCompleted {
            cycles_completed: 2,
            total_work_seconds: 3000,
            total_break_seconds: 600,
        })
    );
    let phase_ends = events
        .iter()
        .filter(|e| matches!(e, TimerEvent::PhaseCompleted { .. }))
        .count();
    assert_eq!(phase_ends, 4);
}

/// Ticking after completion changes nothing.
#[test]
fn test_completed_session_is_inert() {
    let (mut engine, clock, mut rx) = create_engine(CustomValues::new(1, 1, 1));
    engine.start().unwrap();
    clock.advance_secs(60);
    engine.tick();
    clock.advance_secs(60);
    let done = engine.tick().snapshot;
    assert_eq!(done.status, TimerStatus::CycleComplete);
    drain(&mut rx);

    clock.advance_secs(3600);
    let outcome = engine.tick();
    assert!(!outcome.transitioned);
    assert_eq!(outcome.snapshot, done);
    assert!(drain(&mut rx).is_empty());
}

/// Starting after completion begins a fresh session.
#[test]
fn test_restart_after_completion() {
    let (mut engine, clock, _rx) = create_engine(CustomValues::new(1, 1, 1));
    engine.start().unwrap();
    clock.advance_secs(60);
    engine.tick();
    clock.advance_secs(60);
    engine.tick();

    let snap = engine.start().unwrap();
    assert_eq!(snap.status, TimerStatus::RunningWork);
    assert_eq!(snap.cycles_completed, 0);
    assert_eq!(snap.total_work_seconds, 0);
    assert_eq!(snap.remaining_seconds, 60);
}

// ============================================================================
// Configuration
// ============================================================================

/// A zero work duration is rejected and nothing changes.
#[test]
fn test_invalid_configuration_keeps_prior_method() {
    let (mut engine, _clock, _rx) = create_engine(CustomValues::new(30, 10, 3));
    let before = *engine.method();

    let result = engine.configure(MethodName::Custom, Some(CustomValues::new(0, 5, 4)));

    assert!(matches!(
        result,
        Err(TimerError::InvalidConfiguration { field: "work", .. })
    ));
    assert_eq!(*engine.method(), before);
    assert_eq!(engine.method_name(), MethodName::Custom);
}

/// Switching methods mid-session resets without starting.
#[test]
fn test_switch_method_resets() {
    let (mut engine, clock, _rx) = create_engine(CustomValues::new(1, 1, 2));
    engine.start().unwrap();
    clock.advance_secs(60);
    engine.tick();

    let snap = engine.switch_method(MethodName::Pomodoro).unwrap();
    assert_eq!(snap.status, TimerStatus::Stopped);
    assert_eq!(snap.total_work_seconds, 0);
    assert_eq!(engine.method().work_minutes(), 25);
}

// ============================================================================
// Stop / Restart
// ============================================================================

/// Stopping at 900 seconds left, then starting again, restarts at 1500.
#[test]
fn test_stop_then_restart_at_full_duration() {
    let (mut engine, clock, _rx) = create_engine(CustomValues::new(25, 5, 4));
    engine.start().unwrap();

    clock.advance_secs(600);
    engine.tick();
    let stopped = engine.stop().unwrap();
    assert_eq!(stopped.remaining_seconds, 900);
    assert_eq!(stopped.status, TimerStatus::Stopped);

    // Time passing while stopped is ignored
    clock.advance_secs(10_000);
    assert_eq!(engine.tick().snapshot.remaining_seconds, 900);

    let restarted = engine.start().unwrap();
    assert_eq!(restarted.phase, Phase::Work);
    assert_eq!(restarted.remaining_seconds, 1500);
}

// ============================================================================
// Polling
// ============================================================================

/// Repeated polls at the same instant never double count.
#[test]
fn test_repeated_polls_are_idempotent() {
    let (mut engine, clock, _rx) = create_engine(CustomValues::new(25, 5, 4));
    engine.start().unwrap();
    clock.advance_secs(100);

    let first = engine.tick().snapshot;
    let second = engine.tick().snapshot;
    let third = engine.tick().snapshot;

    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(first.remaining_seconds, 1400);
}

/// A poll arriving long after expiry transitions exactly once.
#[test]
fn test_late_poll_transitions_once() {
    let (mut engine, clock, mut rx) = create_engine(CustomValues::new(25, 5, 4));
    engine.start().unwrap();
    drain(&mut rx);

    // 40 minutes late: well past the work phase and its break
    clock.advance(Duration::from_secs(2400));
    let outcome = engine.tick();
    assert!(outcome.transitioned);
    assert_eq!(outcome.snapshot.phase, Phase::Break);
    assert_eq!(outcome.snapshot.remaining_seconds, 300);

    let again = engine.tick();
    assert!(!again.transitioned);

    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![TimerEvent::PhaseCompleted {
            phase: Phase::Work,
            cycles_completed: 0,
        }]
    );
}

/// Sub-second polls report whole seconds.
#[test]
fn test_sub_second_polls() {
    let (mut engine, clock, _rx) = create_engine(CustomValues::new(1, 1, 1));
    engine.start().unwrap();

    clock.advance(Duration::from_millis(999));
    assert_eq!(engine.tick().snapshot.remaining_seconds, 60);

    clock.advance(Duration::from_millis(1));
    assert_eq!(engine.tick().snapshot.remaining_seconds, 59);
}
