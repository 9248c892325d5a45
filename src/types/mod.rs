//! Core data types for the interval timer.
//!
//! This module defines the data structures used for:
//! - Phases and machine status
//! - Methods (built-in presets and custom values) with validation
//! - Read-only state snapshots
//! - IPC request/response serialization

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::timer::TimerError;

// ============================================================================
// Phase
// ============================================================================

/// The unit of countdown: either a work phase or a break phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Focused work
    #[default]
    Work,
    /// Rest between work phases
    Break,
}

impl Phase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Break => "break",
        }
    }

    /// Returns the human-readable label shown in terminal output.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::Break => "Break",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// TimerStatus
// ============================================================================

/// Coarse status of the cycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    /// Not counting down; progress is frozen
    #[default]
    Stopped,
    /// Counting down a work phase
    RunningWork,
    /// Counting down a break phase
    RunningBreak,
    /// All configured cycles are finished
    CycleComplete,
}

impl TimerStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Stopped => "stopped",
            TimerStatus::RunningWork => "running_work",
            TimerStatus::RunningBreak => "running_break",
            TimerStatus::CycleComplete => "cycle_complete",
        }
    }

    /// Returns true if the countdown is active.
    pub fn is_running(&self) -> bool {
        matches!(self, TimerStatus::RunningWork | TimerStatus::RunningBreak)
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Method
// ============================================================================

/// Phase durations and target cycle count.
///
/// All three values are strictly positive; the only ways to obtain a `Method`
/// are the built-in constants and validated conversion from [`CustomValues`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CustomValues")]
pub struct Method {
    /// Work phase length in minutes
    #[serde(rename = "workMinutes")]
    work_minutes: u32,
    /// Break phase length in minutes
    #[serde(rename = "breakMinutes")]
    break_minutes: u32,
    /// Number of Work+Break pairs in a session
    cycles: u32,
}

impl Method {
    /// Classic 25/5 schedule.
    pub const POMODORO: Method = Method::preset(25, 5, 4);
    /// Long 50/10 schedule.
    pub const LONG_WORK: Method = Method::preset(50, 10, 4);
    /// Short 15/3 schedule.
    pub const SHORT_WORK: Method = Method::preset(15, 3, 4);

    const fn preset(work_minutes: u32, break_minutes: u32, cycles: u32) -> Self {
        Self {
            work_minutes,
            break_minutes,
            cycles,
        }
    }

    /// Creates a method, rejecting any zero value.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfiguration`] naming the first invalid field.
    pub fn new(work_minutes: u32, break_minutes: u32, cycles: u32) -> Result<Self, TimerError> {
        CustomValues::new(
            i64::from(work_minutes),
            i64::from(break_minutes),
            i64::from(cycles),
        )
        .try_into()
    }

    pub fn work_minutes(&self) -> u32 {
        self.work_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Work phase length in seconds.
    pub fn work_seconds(&self) -> u64 {
        u64::from(self.work_minutes) * 60
    }

    /// Break phase length in seconds.
    pub fn break_seconds(&self) -> u64 {
        u64::from(self.break_minutes) * 60
    }

    /// Length of the given phase in seconds.
    pub fn phase_seconds(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_seconds(),
            Phase::Break => self.break_seconds(),
        }
    }

    /// Returns a copy with one field replaced.
    pub(crate) fn with_field(mut self, field: CustomField, value: u32) -> Self {
        match field {
            CustomField::Work => self.work_minutes = value,
            CustomField::Break => self.break_minutes = value,
            CustomField::Cycles => self.cycles = value,
        }
        self
    }
}

impl Default for Method {
    fn default() -> Self {
        Method::POMODORO
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}分作業 / {}分休憩 x {}サイクル",
            self.work_minutes, self.break_minutes, self.cycles
        )
    }
}

// ============================================================================
// CustomValues
// ============================================================================

/// Unvalidated custom method values, as typed by a user.
///
/// Signed so that zero and negative input can be represented and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomValues {
    /// Work phase length in minutes
    #[serde(rename = "workMinutes")]
    pub work_minutes: i64,
    /// Break phase length in minutes
    #[serde(rename = "breakMinutes")]
    pub break_minutes: i64,
    /// Number of cycles
    pub cycles: i64,
}

impl CustomValues {
    pub fn new(work_minutes: i64, break_minutes: i64, cycles: i64) -> Self {
        Self {
            work_minutes,
            break_minutes,
            cycles,
        }
    }
}

impl From<Method> for CustomValues {
    fn from(method: Method) -> Self {
        Self::new(
            i64::from(method.work_minutes),
            i64::from(method.break_minutes),
            i64::from(method.cycles),
        )
    }
}

impl TryFrom<CustomValues> for Method {
    type Error = TimerError;

    fn try_from(values: CustomValues) -> Result<Self, Self::Error> {
        Ok(Method {
            work_minutes: CustomField::Work.validate(values.work_minutes)?,
            break_minutes: CustomField::Break.validate(values.break_minutes)?,
            cycles: CustomField::Cycles.validate(values.cycles)?,
        })
    }
}

// ============================================================================
// CustomField
// ============================================================================

/// One editable field of the custom method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomField {
    Work,
    Break,
    Cycles,
}

impl CustomField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomField::Work => "work",
            CustomField::Break => "break",
            CustomField::Cycles => "cycles",
        }
    }

    /// Checks that a raw value is a positive integer that fits the field.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfiguration`] for zero, negative or
    /// out-of-range values.
    pub fn validate(&self, value: i64) -> Result<u32, TimerError> {
        match u32::try_from(value) {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(TimerError::InvalidConfiguration {
                field: self.as_str(),
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for CustomField {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(CustomField::Work),
            "break" => Ok(CustomField::Break),
            "cycles" => Ok(CustomField::Cycles),
            _ => Err(TimerError::InvalidConfiguration {
                field: "field",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CustomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// MethodName
// ============================================================================

/// Selectable method: a built-in preset or the user's custom values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodName {
    /// 25/5 x 4
    #[default]
    Pomodoro,
    /// 50/10 x 4
    LongWork,
    /// 15/3 x 4
    ShortWork,
    /// User-defined values
    Custom,
}

impl MethodName {
    /// Every selectable method, presets first.
    pub const ALL: [MethodName; 4] = [
        MethodName::Pomodoro,
        MethodName::LongWork,
        MethodName::ShortWork,
        MethodName::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MethodName::Pomodoro => "pomodoro",
            MethodName::LongWork => "long-work",
            MethodName::ShortWork => "short-work",
            MethodName::Custom => "custom",
        }
    }

    /// Returns the fixed values of a built-in method, `None` for custom.
    pub fn preset(&self) -> Option<Method> {
        match self {
            MethodName::Pomodoro => Some(Method::POMODORO),
            MethodName::LongWork => Some(Method::LONG_WORK),
            MethodName::ShortWork => Some(Method::SHORT_WORK),
            MethodName::Custom => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        *self == MethodName::Custom
    }
}

impl FromStr for MethodName {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pomodoro" | "classic" => Ok(MethodName::Pomodoro),
            "long-work" | "longwork" | "long" => Ok(MethodName::LongWork),
            "short-work" | "shortwork" | "short" => Ok(MethodName::ShortWork),
            "custom" => Ok(MethodName::Custom),
            _ => Err(TimerError::InvalidConfiguration {
                field: "method",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Read-only view of the timer state handed to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Machine status
    pub status: TimerStatus,
    /// Current phase
    pub phase: Phase,
    /// Whether the countdown is active
    pub running: bool,
    /// Last computed remaining seconds of the current phase
    #[serde(rename = "remainingSeconds")]
    pub remaining_seconds: u64,
    /// Finished Work+Break pairs
    #[serde(rename = "cyclesCompleted")]
    pub cycles_completed: u32,
    /// Accumulated work seconds
    #[serde(rename = "totalWorkSeconds")]
    pub total_work_seconds: u64,
    /// Accumulated break seconds
    #[serde(rename = "totalBreakSeconds")]
    pub total_break_seconds: u64,
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Select a method, optionally with custom values
    Configure {
        method: MethodName,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        custom: Option<CustomValues>,
    },
    /// Overwrite one field of the custom method
    Edit { field: CustomField, value: i64 },
    /// Overwrite several fields of the custom method in one step
    #[serde(rename = "edit_fields")]
    EditFields { edits: Vec<(CustomField, i64)> },
    /// Start a session
    Start,
    /// Stop the countdown
    Stop,
    /// Clear all progress
    Reset,
    /// Switch to another method without custom values
    Switch { method: MethodName },
    /// Query the current status
    Status,
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseData {
    /// Machine status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Current phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Remaining seconds
    #[serde(rename = "remainingSeconds", skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
    /// Remaining time as M:SS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<String>,
    /// Percentage of the current phase elapsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Completed cycles
    #[serde(rename = "cyclesCompleted", skip_serializing_if = "Option::is_none")]
    pub cycles_completed: Option<u32>,
    /// Target cycles of the active method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycles: Option<u32>,
    /// Accumulated work seconds
    #[serde(rename = "totalWorkSeconds", skip_serializing_if = "Option::is_none")]
    pub total_work_seconds: Option<u64>,
    /// Accumulated break seconds
    #[serde(rename = "totalBreakSeconds", skip_serializing_if = "Option::is_none")]
    pub total_break_seconds: Option<u64>,
    /// Selected method name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Active method values
    #[serde(rename = "methodValues", skip_serializing_if = "Option::is_none")]
    pub method_values: Option<CustomValues>,
}

impl ResponseData {
    /// Creates response data from a snapshot and the active method.
    pub fn from_snapshot(snapshot: &Snapshot, name: MethodName, method: &Method) -> Self {
        use crate::timer::{format_duration, progress_percent};

        let progress = (snapshot.status != TimerStatus::Stopped || snapshot.remaining_seconds > 0)
            .then(|| progress_percent(snapshot.phase, snapshot.remaining_seconds, method));

        Self {
            state: Some(snapshot.status.as_str().to_string()),
            phase: Some(snapshot.phase.as_str().to_string()),
            remaining_seconds: Some(snapshot.remaining_seconds),
            remaining: Some(format_duration(snapshot.remaining_seconds)),
            progress,
            cycles_completed: Some(snapshot.cycles_completed),
            cycles: Some(method.cycles()),
            total_work_seconds: Some(snapshot.total_work_seconds),
            total_break_seconds: Some(snapshot.total_break_seconds),
            method: Some(name.as_str().to_string()),
            method_values: Some((*method).into()),
        }
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true if the daemon accepted the request.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================
