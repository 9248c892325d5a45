//! Property tests for the timer core.
//!
//! Randomized checks of the countdown and state machine invariants:
//! remaining time stays within the phase, polls are idempotent, progress is
//! monotonic, totals are whole phases, and cycles never exceed the target.

use std::time::{Duration, Instant};

use proptest::prelude::*;

use pomocycle::timer::{
    format_duration, parse_duration, progress_percent, remaining_at, CycleMachine,
};
use pomocycle::types::{Method, Phase, TimerStatus};

fn method_strategy() -> impl Strategy<Value = Method> {
    (1u32..=60, 1u32..=30, 1u32..=6)
        .prop_map(|(work, brk, cycles)| Method::new(work, brk, cycles).unwrap())
}

proptest! {
    #[test]
    fn remaining_never_exceeds_duration(duration in 0u64..100_000, elapsed_ms in 0u64..200_000_000) {
        let start = Instant::now();
        let remaining = remaining_at(start + Duration::from_millis(elapsed_ms), start, duration);

        prop_assert!(remaining <= duration);
        prop_assert_eq!(remaining, duration.saturating_sub(elapsed_ms / 1000));
    }

    #[test]
    fn format_then_parse_is_identity(seconds in 0u64..10_000_000) {
        prop_assert_eq!(parse_duration(&format_duration(seconds)), Some(seconds));
    }

    #[test]
    fn progress_is_monotonic_within_phase(method in method_strategy(), a in 0u64..4000, b in 0u64..4000) {
        let (later, earlier) = if a <= b { (a, b) } else { (b, a) };
        let p_earlier = progress_percent(Phase::Work, earlier, &method);
        let p_later = progress_percent(Phase::Work, later, &method);

        prop_assert!((0.0..=100.0).contains(&p_earlier));
        prop_assert!(p_later >= p_earlier);
    }

    #[test]
    fn repeated_ticks_are_idempotent(method in method_strategy(), offset in 0u64..20_000, repeats in 1usize..5) {
        let t0 = Instant::now();
        let mut machine = CycleMachine::new(method);
        machine.start(t0).unwrap();

        let now = t0 + Duration::from_secs(offset);
        let first = machine.tick(now);
        for _ in 0..repeats {
            let again = machine.tick(now);
            prop_assert!(!again.transitioned);
            prop_assert_eq!(again.snapshot, first.snapshot);
        }
    }

    #[test]
    fn random_polling_respects_invariants(
        method in method_strategy(),
        steps in prop::collection::vec(0u64..900, 1..200),
    ) {
        let t0 = Instant::now();
        let mut machine = CycleMachine::new(method);
        machine.start(t0).unwrap();

        let mut now = t0;
        let mut transitions = 0u32;
        for step in steps {
            now += Duration::from_secs(step);
            let outcome = machine.tick(now);
            let snap = outcome.snapshot;
            if outcome.transitioned {
                transitions += 1;
            }

            prop_assert!(snap.remaining_seconds <= method.phase_seconds(snap.phase));
            prop_assert!(snap.cycles_completed <= method.cycles());
            prop_assert_eq!(snap.total_work_seconds % method.work_seconds(), 0);
            prop_assert_eq!(snap.total_break_seconds % method.break_seconds(), 0);
            prop_assert_eq!(
                snap.total_break_seconds / method.break_seconds(),
                u64::from(snap.cycles_completed)
            );
            prop_assert_eq!(snap.status == TimerStatus::CycleComplete, !snap.running);
        }

        // One Work and one Break expiry per completed cycle, plus the Work
        // expiry that opened a running Break
        let snap = machine.snapshot();
        let open_break = snap.running && snap.phase == Phase::Break;
        let expected = snap.cycles_completed * 2 + u32::from(open_break);
        prop_assert_eq!(transitions, expected);
    }
}
