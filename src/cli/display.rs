//! Display utilities for the interval timer CLI.
//!
//! This module provides formatted output for:
//! - Success messages
//! - Error messages
//! - Status display
//! - The live line and summary of a foreground session

use std::io::Write;

use crate::timer::{format_duration, progress_bar, progress_percent};
use crate::types::{IpcResponse, Method, MethodName, ResponseData, Snapshot, TimerStatus};

/// Width of the progress bar, in cells.
const BAR_WIDTH: usize = 20;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows a success message for timer start.
    pub fn show_start_success(response: &IpcResponse) {
        println!("* {}", response.message);
        Self::print_remaining(response.data.as_ref());
    }

    /// Shows a success message for timer stop.
    pub fn show_stop_success(response: &IpcResponse) {
        println!("[] {}", response.message);
        Self::print_remaining(response.data.as_ref());
    }

    /// Shows a success message for timer reset.
    pub fn show_reset_success(response: &IpcResponse) {
        println!("<< {}", response.message);
    }

    /// Shows a success message for method selection and edits.
    pub fn show_method_success(response: &IpcResponse) {
        println!("* {}", response.message);
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        match &response.data {
            Some(data) => {
                for line in Self::status_lines(data) {
                    println!("{}", line);
                }
            }
            None => println!("タイマーは起動していません"),
        }
    }

    /// Shows the selectable methods, marking `selected`.
    pub fn show_methods(selected: Option<MethodName>) {
        for line in Self::method_lines(selected) {
            println!("{}", line);
        }
    }

    /// Overwrites the current terminal line with the session's live state.
    pub fn show_live(snapshot: &Snapshot, method: &Method) {
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "\r\x1b[2K{}", Self::live_line(snapshot, method));
        let _ = stdout.flush();
    }

    /// Prints a notification on its own line, above the live line.
    pub fn show_notification(message: &str) {
        println!("\r\x1b[2K>> {}", message);
    }

    /// Shows the totals at the end of a foreground session.
    pub fn show_session_summary(snapshot: &Snapshot, method: &Method) {
        println!();
        for line in Self::summary_lines(snapshot, method) {
            println!("{}", line);
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    // ------------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------------

    /// Formats `Work 12:34 [#####-----] 1/4`.
    pub fn live_line(snapshot: &Snapshot, method: &Method) -> String {
        let percent = progress_percent(snapshot.phase, snapshot.remaining_seconds, method);
        format!(
            "{:<5} {} {} {}",
            snapshot.phase.label(),
            format_duration(snapshot.remaining_seconds),
            progress_bar(percent, BAR_WIDTH),
            Self::cycle_label(snapshot.status, snapshot.cycles_completed, method.cycles())
        )
    }

    /// Returns `current/total`, where current is the cycle in progress.
    fn cycle_label(status: TimerStatus, completed: u32, total: u32) -> String {
        let current = match status {
            TimerStatus::RunningWork | TimerStatus::RunningBreak => {
                completed.saturating_add(1).min(total)
            }
            _ => completed,
        };
        format!("{}/{}", current, total)
    }

    fn status_lines(data: &ResponseData) -> Vec<String> {
        let mut lines = vec![
            "インターバルタイマー ステータス".to_string(),
            "─────────────────────────────".to_string(),
        ];

        let state = data.state.as_deref().unwrap_or("unknown");
        lines.push(format!("状態: {}", Self::state_label(state)));

        if let Some(method) = &data.method {
            let values = data
                .method_values
                .map(|v| {
                    format!(
                        " ({}分作業 / {}分休憩 x {})",
                        v.work_minutes, v.break_minutes, v.cycles
                    )
                })
                .unwrap_or_default();
            lines.push(format!("メソッド: {}{}", method, values));
        }

        if state != "stopped" || data.remaining_seconds.is_some_and(|r| r > 0) {
            if let Some(remaining) = &data.remaining {
                let phase = match data.phase.as_deref() {
                    Some("break") => "休憩",
                    _ => "作業",
                };
                lines.push(format!("残り時間 ({}): {}", phase, remaining));
            }
            if let Some(progress) = data.progress {
                lines.push(format!(
                    "進捗: {} {:.0}%",
                    progress_bar(progress, BAR_WIDTH),
                    progress
                ));
            }
        }

        if let (Some(completed), Some(cycles)) = (data.cycles_completed, data.cycles) {
            lines.push(format!("サイクル: {}/{}", completed, cycles));
        }

        if let (Some(work), Some(rest)) = (data.total_work_seconds, data.total_break_seconds) {
            lines.push(format!(
                "合計: 作業 {} / 休憩 {}",
                format_duration(work),
                format_duration(rest)
            ));
        }

        lines
    }

    fn state_label(state: &str) -> &str {
        match state {
            "running_work" => "作業中",
            "running_break" => "休憩中",
            "cycle_complete" => "全サイクル完了",
            "stopped" => "停止中",
            other => other,
        }
    }

    fn method_lines(selected: Option<MethodName>) -> Vec<String> {
        MethodName::ALL
            .iter()
            .map(|name| {
                let marker = if Some(*name) == selected { "*" } else { " " };
                let values = match name.preset() {
                    Some(method) => method.to_string(),
                    None => "作業時間・休憩時間・サイクル数を指定".to_string(),
                };
                format!("{} {:<11} {}", marker, name.as_str(), values)
            })
            .collect()
    }

    fn summary_lines(snapshot: &Snapshot, method: &Method) -> Vec<String> {
        let headline = if snapshot.status == TimerStatus::CycleComplete {
            "セッション完了"
        } else {
            "セッション中断"
        };

        vec![
            headline.to_string(),
            format!(
                "  サイクル: {}/{}",
                snapshot.cycles_completed,
                method.cycles()
            ),
            format!("  作業時間: {}", format_duration(snapshot.total_work_seconds)),
            format!(
                "  休憩時間: {}",
                format_duration(snapshot.total_break_seconds)
            ),
        ]
    }

    fn print_remaining(data: Option<&ResponseData>) {
        if let Some(remaining) = data.and_then(|d| d.remaining.as_deref()) {
            println!("  残り時間: {}", remaining);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
