//! Consumer side of the timer event channel.
//!
//! The engine never waits on notifications: it pushes `TimerEvent`s into an
//! unbounded channel and this task turns them into log lines and alarms.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::sound::{alarm_for, SoundPlayer, SoundSource};
use crate::timer::format_duration;
use crate::types::Phase;

use super::timer::TimerEvent;

/// Returns the user-facing notification text for an event, if it has one.
pub fn notification_message(event: &TimerEvent) -> Option<String> {
    match event {
        TimerEvent::PhaseCompleted {
            phase: Phase::Work,
            cycles_completed,
        } => Some(format!(
            "作業時間が終了しました。休憩しましょう (完了サイクル: {})",
            cycles_completed
        )),
        TimerEvent::PhaseCompleted {
            phase: Phase::Break,
            cycles_completed,
        } => Some(format!(
            "休憩時間が終了しました (完了サイクル: {})",
            cycles_completed
        )),
        TimerEvent::SessionCompleted {
            cycles_completed,
            total_work_seconds,
            total_break_seconds,
        } => Some(format!(
            "全{}サイクルが完了しました (作業 {} / 休憩 {})",
            cycles_completed,
            format_duration(*total_work_seconds),
            format_duration(*total_break_seconds)
        )),
        _ => None,
    }
}

/// Consumes events until every sender is dropped.
///
/// Events that arrive together (a break expiry immediately followed by the
/// session end) ring once, with the alarm of the last one. Playback errors
/// are logged and ignored.
pub async fn run_notifier(
    mut rx: mpsc::UnboundedReceiver<TimerEvent>,
    player: Arc<dyn SoundPlayer>,
    alarm_file: Option<SoundSource>,
) {
    while let Some(first) = rx.recv().await {
        let mut alarm = None;
        let mut next = Some(first);

        while let Some(event) = next {
            if let Some(message) = notification_message(&event) {
                info!("{}", message);
            } else {
                debug!("Timer event: {:?}", event);
            }
            if let Some(source) = alarm_for(&event, alarm_file.as_ref()) {
                alarm = Some(source);
            }
            next = rx.try_recv().ok();
        }

        if let Some(source) = alarm {
            if let Err(e) = player.play(&source) {
                warn!("Failed to play alarm '{}': {}", source.name(), e);
            }
        }
    }

    debug!("Event channel closed, notifier exiting");
}
