//! Pomocycle Library
//!
//! This library provides the core functionality for the Pomocycle CLI.
//! It includes:
//! - Timer core: drift-free countdown, work/break state machine, method
//!   resolution and progress formatting
//! - Timer engine wiring the core to a clock and an event channel
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing, display utilities and the foreground session
//! - Alarm playback for phase expiry
//! - Type definitions for methods, state snapshots and IPC messages

pub mod cli;
pub mod daemon;
pub mod sound;
pub mod timer;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    CustomField, CustomValues, IpcRequest, IpcResponse, Method, MethodName, Phase, ResponseData,
    Snapshot, TimerStatus,
};

// Re-export timer core types
pub use timer::{Clock, CycleMachine, ManualClock, ScheduleResolver, TimerError, TokioClock};

// Re-export daemon types
pub use daemon::{DaemonConfig, TimerEngine, TimerEvent};

// Re-export sound types
pub use sound::{create_player, MockSoundPlayer, SoundError, SoundPlayer, SoundSource};
