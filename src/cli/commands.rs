//! Command definitions for the interval timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::daemon::{DEFAULT_POLL_MS, MAX_POLL_MS, MIN_POLL_MS};
use crate::types::{CustomField, CustomValues, Method, MethodName};

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomocycle - a work/break interval timer
#[derive(Parser, Debug)]
#[command(
    name = "pomocycle",
    version,
    about = "作業と休憩を繰り返すインターバルタイマー",
    long_about = "作業フェーズと休憩フェーズを交互に計測するタイマー。\n\
                  ポモドーロなどのプリセットとカスタム設定に対応し、\n\
                  フォアグラウンド実行 (run) とデーモン経由の操作ができます。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Daemon socket path
    #[arg(short, long, global = true, env = "POMOCYCLE_SOCKET")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a session on the daemon
    Start,

    /// Stop the daemon's countdown
    Stop,

    /// Clear all progress on the daemon
    Reset,

    /// Show the daemon's timer status
    Status,

    /// Select a method on the daemon
    Method(MethodArgs),

    /// Change one value of the custom method
    Edit {
        /// Field to change (work, break, cycles)
        #[arg(value_parser = parse_custom_field)]
        field: CustomField,

        /// New value (minutes, or a cycle count)
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },

    /// List the available methods
    Methods,

    /// Run a session in the foreground
    Run(SessionArgs),

    /// Run as daemon (background service)
    Daemon(SessionArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Arguments
// ============================================================================

/// Custom method values given on the command line.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomArgs {
    /// Work duration in minutes
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub work: Option<u32>,

    /// Break duration in minutes
    #[arg(
        short,
        long = "break",
        value_name = "BREAK",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub break_minutes: Option<u32>,

    /// Number of work/break cycles
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub cycles: Option<u32>,
}

impl CustomArgs {
    /// Returns true if no value was given.
    pub fn is_empty(&self) -> bool {
        self.work.is_none() && self.break_minutes.is_none() && self.cycles.is_none()
    }

    /// Returns the given values as field edits.
    pub fn edits(&self) -> Vec<(CustomField, i64)> {
        [
            (CustomField::Work, self.work),
            (CustomField::Break, self.break_minutes),
            (CustomField::Cycles, self.cycles),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, i64::from(v))))
        .collect()
    }

    /// Fills the missing values from `base`.
    pub fn over(&self, base: Method) -> CustomValues {
        CustomValues::new(
            i64::from(self.work.unwrap_or(base.work_minutes())),
            i64::from(self.break_minutes.unwrap_or(base.break_minutes())),
            i64::from(self.cycles.unwrap_or(base.cycles())),
        )
    }

    /// Rejects custom values combined with a preset.
    ///
    /// # Errors
    ///
    /// Returns a message when values are given for a built-in method.
    pub fn check_against(&self, method: MethodName) -> Result<(), String> {
        if !method.is_custom() && !self.is_empty() {
            return Err(format!(
                "{} はプリセットのため値を変更できません。custom を指定してください",
                method
            ));
        }
        Ok(())
    }
}

/// Arguments for the method command
#[derive(Args, Debug, Clone)]
pub struct MethodArgs {
    /// Method name (pomodoro, long-work, short-work, custom)
    #[arg(value_parser = parse_method_name)]
    pub name: MethodName,

    #[command(flatten)]
    pub custom: CustomArgs,
}

/// Arguments shared by the foreground session and the daemon
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Method to use (pomodoro, long-work, short-work, custom)
    #[arg(short, long, default_value = "pomodoro", value_parser = parse_method_name)]
    pub method: MethodName,

    #[command(flatten)]
    pub custom: CustomArgs,

    /// Polling period in milliseconds (10-1000)
    #[arg(
        long,
        env = "POMOCYCLE_POLL_MS",
        default_value_t = DEFAULT_POLL_MS,
        value_parser = clap::value_parser!(u64).range(MIN_POLL_MS..=MAX_POLL_MS)
    )]
    pub poll_ms: u64,

    /// Disable alarm sounds
    #[arg(long)]
    pub no_sound: bool,

    /// Audio file to play instead of the built-in chimes
    #[arg(long, env = "POMOCYCLE_ALARM")]
    pub alarm: Option<PathBuf>,
}

impl SessionArgs {
    /// Returns the custom values to apply at startup.
    ///
    /// Missing values default to the pomodoro preset.
    pub fn custom_values(&self) -> Option<CustomValues> {
        (self.method.is_custom() && !self.custom.is_empty())
            .then(|| self.custom.over(Method::POMODORO))
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Parses a method name, accepting the usual aliases.
fn parse_method_name(s: &str) -> Result<MethodName, String> {
    s.parse().map_err(|_| {
        format!(
            "不明なメソッドです: {} (pomodoro, long-work, short-work, custom)",
            s
        )
    })
}

/// Parses a custom field name.
fn parse_custom_field(s: &str) -> Result<CustomField, String> {
    s.parse()
        .map_err(|_| format!("不明な項目です: {} (work, break, cycles)", s))
}

// ============================================================================
// Tests
// ============================================================================
