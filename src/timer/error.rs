//! Timer error types.
//!
//! The core performs no I/O, so only two error classes exist: configuration
//! values that are rejected before being applied, and operations that are not
//! valid in the current machine status. Both are recoverable by the caller.

use thiserror::Error;

use crate::types::TimerStatus;

/// Errors returned by the schedule resolver and the cycle state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// A method name, field name or duration/cycle value was rejected.
    #[error("不正な設定値です ({field}: {value})")]
    InvalidConfiguration {
        /// Name of the rejected field
        field: &'static str,
        /// The value as supplied
        value: String,
    },

    /// The operation is not valid in the current status.
    #[error("{operation} はこの状態では実行できません (状態: {status})")]
    InvalidTransition {
        /// Name of the attempted operation
        operation: &'static str,
        /// Status at the time of the call
        status: TimerStatus,
    },
}

impl TimerError {
    /// Returns true if this error came from configuration validation.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } => "作業時間・休憩時間・サイクル数には正の整数を指定してください",
            Self::InvalidTransition { status, .. } if status.is_running() => {
                "タイマーは実行中です。先に stop してください"
            }
            Self::InvalidTransition { .. } => "タイマーは実行されていません",
        }
    }
}
