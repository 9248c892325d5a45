//! Countdown computation.
//!
//! Remaining time is always derived from a fixed phase reference and the
//! query instant, never by decrementing a counter per tick. A poll that
//! arrives late still reports the correct value, and missed polls cannot
//! accumulate drift.

use std::time::Instant;

/// Remaining whole seconds of a phase at `now`.
///
/// `elapsed` is floored to whole seconds. An instant earlier than the
/// reference counts as zero elapsed time; the result is clamped at zero.
pub fn remaining_at(now: Instant, phase_start: Instant, phase_seconds: u64) -> u64 {
    let elapsed = now.saturating_duration_since(phase_start).as_secs();
    phase_seconds.saturating_sub(elapsed)
}

/// True once the phase has no time left at `now`.
pub fn is_expired(now: Instant, phase_start: Instant, phase_seconds: u64) -> bool {
    remaining_at(now, phase_start, phase_seconds) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_full_duration_at_reference() {
        let start = Instant::now();
        assert_eq!(remaining_at(start, start, 1500), 1500);
    }

    #[test]
    fn test_elapsed_is_floored() {
        let start = Instant::now();
        let now = start + Duration::from_millis(1999);
        assert_eq!(remaining_at(now, start, 60), 59);
    }

    #[test]
    fn test_clamped_at_zero() {
        let start = Instant::now();
        let now = start + Duration::from_secs(10_000);
        assert_eq!(remaining_at(now, start, 300), 0);
        assert!(is_expired(now, start, 300));
    }

    #[test]
    fn test_expires_exactly_at_duration() {
        let start = Instant::now();
        assert!(!is_expired(start + Duration::from_millis(299_999), start, 300));
        assert!(is_expired(start + Duration::from_secs(300), start, 300));
    }

    #[test]
    fn test_now_before_reference() {
        let now = Instant::now();
        let start = now + Duration::from_secs(5);
        assert_eq!(remaining_at(now, start, 120), 120);
    }

    #[test]
    fn test_late_poll_has_no_drift() {
        // A single late poll reports the same value as a poll at every second.
        let start = Instant::now();
        let mut stepped = 0;
        for s in 0..=700 {
            stepped = remaining_at(start + Duration::from_secs(s), start, 1500);
        }
        let late = remaining_at(start + Duration::from_secs(700), start, 1500);
        assert_eq!(stepped, late);
        assert_eq!(late, 800);
    }
}
