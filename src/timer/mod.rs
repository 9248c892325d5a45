//! Timer core: schedule resolution, countdown and the cycle state machine.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   Method   ┌──────────────────┐
//! │ ScheduleResolver │──────────▶│   CycleMachine   │◀── start/stop/reset/tick(now)
//! └──────────────────┘            └────────┬─────────┘
//!                                          │ remaining_at(now, start, duration)
//!                                          ▼
//!                                 ┌──────────────────┐
//!                                 │    countdown     │
//!                                 └──────────────────┘
//! ```
//!
//! `progress` holds the pure formatting helpers hosts use to render a
//! [`Snapshot`](crate::types::Snapshot).

pub mod clock;
pub mod countdown;
mod error;
pub mod machine;
pub mod progress;
pub mod schedule;

pub use clock::{Clock, ManualClock, TokioClock};
pub use countdown::{is_expired, remaining_at};
pub use error::TimerError;
pub use machine::{CycleMachine, PhaseCompleteEvent, TickOutcome, TimerState};
pub use progress::{format_duration, parse_duration, progress_bar, progress_percent};
pub use schedule::ScheduleResolver;
