//! Timer engine for the daemon and the foreground session.
//!
//! This module wires the timer core to its host:
//! - Method selection through the schedule resolver
//! - Start/stop/reset/switch on the cycle state machine
//! - Periodic polling with tokio::time::interval
//! - Event firing for notifications and sounds

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::timer::{
    Clock, CycleMachine, ScheduleResolver, TickOutcome, TimerError, TokioClock,
};
use crate::types::{
    CustomField, CustomValues, Method, MethodName, Phase, ResponseData, Snapshot,
};

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for notifications and external integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// A session (or a restarted work phase) began
    Started {
        /// Remaining seconds of the new work phase
        remaining_seconds: u64,
    },
    /// The countdown was stopped
    Stopped {
        /// Frozen remaining seconds
        remaining_seconds: u64,
    },
    /// All progress was cleared
    Reset,
    /// A different method became active
    MethodChanged {
        /// Selected name
        name: MethodName,
        /// Resolved values
        method: Method,
    },
    /// A phase ran out
    PhaseCompleted {
        /// The phase that ended
        phase: Phase,
        /// Cycles completed so far
        cycles_completed: u32,
    },
    /// The last cycle finished
    SessionCompleted {
        /// Cycles completed
        cycles_completed: u32,
        /// Accumulated work seconds
        total_work_seconds: u64,
        /// Accumulated break seconds
        total_break_seconds: u64,
    },
    /// Remaining time changed
    Tick {
        /// Remaining seconds
        remaining_seconds: u64,
    },
}

impl TimerEvent {
    /// Returns true for the events that should trigger an alarm.
    pub fn is_alarm(&self) -> bool {
        matches!(
            self,
            TimerEvent::PhaseCompleted { .. } | TimerEvent::SessionCompleted { .. }
        )
    }
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the state machine, the method selection and the
/// event channel.
pub struct TimerEngine {
    /// Work/Break state machine
    machine: CycleMachine,
    /// Method selection and custom values
    resolver: ScheduleResolver,
    /// Source of `now`
    clock: Arc<dyn Clock>,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates an engine on the tokio clock with `pomodoro` selected.
    pub fn new(event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self::with_clock(Arc::new(TokioClock), event_tx)
    }

    /// Creates an engine reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        let resolver = ScheduleResolver::new();
        Self {
            machine: CycleMachine::new(resolver.active()),
            resolver,
            clock,
            event_tx,
        }
    }

    /// Selects a method and makes it active, resetting all progress.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfiguration`] for invalid custom values;
    /// the engine is left exactly as it was.
    pub fn configure(
        &mut self,
        name: MethodName,
        custom: Option<CustomValues>,
    ) -> Result<Method, TimerError> {
        let method = self.resolver.resolve(name, custom)?;
        self.adopt(method);
        Ok(method)
    }

    /// Edits one custom field; the custom method becomes active.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfiguration`] for non-positive values.
    pub fn edit_custom(&mut self, field: CustomField, value: i64) -> Result<Method, TimerError> {
        let method = self.resolver.edit_custom(field, value)?;
        self.adopt(method);
        Ok(method)
    }

    /// Edits several custom fields as one change; the custom method becomes
    /// active and a single `MethodChanged` is fired.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfiguration`] if any value is
    /// non-positive; no field is applied in that case.
    pub fn edit_custom_fields(
        &mut self,
        edits: &[(CustomField, i64)],
    ) -> Result<Method, TimerError> {
        let method = self.resolver.edit_custom_fields(edits)?;
        self.adopt(method);
        Ok(method)
    }

    /// Switches to `name` using the stored values, resetting progress.
    ///
    /// # Errors
    ///
    /// Never fails for presets; kept fallible to mirror `configure`.
    pub fn switch_method(&mut self, name: MethodName) -> Result<Snapshot, TimerError> {
        self.configure(name, None)?;
        Ok(self.machine.snapshot())
    }

    fn adopt(&mut self, method: Method) {
        self.machine.switch_method(method);
        info!(method = %self.resolver.selected(), "{}", method);
        self.emit(TimerEvent::MethodChanged {
            name: self.resolver.selected(),
            method,
        });
    }

    /// Starts a session at full work duration.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidTransition`] if the timer is already running.
    pub fn start(&mut self) -> Result<Snapshot, TimerError> {
        let snapshot = self.machine.start(self.clock.now())?;
        info!(remaining = snapshot.remaining_seconds, "Timer started");
        self.emit(TimerEvent::Started {
            remaining_seconds: snapshot.remaining_seconds,
        });
        Ok(snapshot)
    }

    /// Stops the timer, keeping its progress.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidTransition`] if the timer is not running.
    pub fn stop(&mut self) -> Result<Snapshot, TimerError> {
        let snapshot = self.machine.stop()?;
        info!(remaining = snapshot.remaining_seconds, "Timer stopped");
        self.emit(TimerEvent::Stopped {
            remaining_seconds: snapshot.remaining_seconds,
        });
        Ok(snapshot)
    }

    /// Clears all progress.
    pub fn reset(&mut self) -> Snapshot {
        let snapshot = self.machine.reset();
        info!("Timer reset");
        self.emit(TimerEvent::Reset);
        snapshot
    }

    /// Polls the machine at the clock's current instant.
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now();
        self.tick_at(now)
    }

    /// Polls the machine at `now` and fires the resulting events.
    pub fn tick_at(&mut self, now: Instant) -> TickOutcome {
        let before = self.machine.snapshot();
        let outcome = self.machine.tick(now);

        match outcome.notification {
            Some(event) => {
                info!(
                    phase = %event.phase,
                    cycles = event.cycles_completed,
                    "Phase complete"
                );
                self.emit(TimerEvent::PhaseCompleted {
                    phase: event.phase,
                    cycles_completed: event.cycles_completed,
                });

                if event.session_complete {
                    let snap = outcome.snapshot;
                    info!(
                        cycles = snap.cycles_completed,
                        work = snap.total_work_seconds,
                        brk = snap.total_break_seconds,
                        "Session complete"
                    );
                    self.emit(TimerEvent::SessionCompleted {
                        cycles_completed: snap.cycles_completed,
                        total_work_seconds: snap.total_work_seconds,
                        total_break_seconds: snap.total_break_seconds,
                    });
                }
            }
            None if before.running
                && outcome.snapshot.remaining_seconds != before.remaining_seconds =>
            {
                self.emit(TimerEvent::Tick {
                    remaining_seconds: outcome.snapshot.remaining_seconds,
                });
            }
            None => {}
        }

        outcome
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.machine.snapshot()
    }

    /// Returns the active method values.
    pub fn method(&self) -> &Method {
        self.machine.method()
    }

    /// Returns the selected method name.
    pub fn method_name(&self) -> MethodName {
        self.resolver.selected()
    }

    /// Returns the stored custom values.
    pub fn custom_method(&self) -> Method {
        self.resolver.custom()
    }

    /// Builds IPC response data for the current state.
    pub fn response_data(&self) -> ResponseData {
        ResponseData::from_snapshot(&self.snapshot(), self.method_name(), self.method())
    }

    /// Sends an event without blocking; a closed receiver is ignored.
    fn emit(&self, event: TimerEvent) {
        if let Err(e) = self.event_tx.send(event) {
            debug!("Event dropped, no receiver: {:?}", e.0);
        }
    }

    /// Polls `engine` every `period` forever.
    ///
    /// Missed polls are skipped rather than bursted; the countdown is
    /// recomputed from the phase reference so nothing is lost. Should be
    /// spawned as a separate tokio task.
    pub async fn run(engine: Arc<Mutex<TimerEngine>>, period: Duration) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            engine.lock().await.tick();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
