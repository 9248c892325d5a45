//! Foreground session for `pomocycle run`.
//!
//! Drives a private engine on the terminal: a live status line, a notice and
//! an alarm at every phase end, and a summary when the session completes or
//! is interrupted with Ctrl-C.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, warn};

use crate::cli::commands::SessionArgs;
use crate::cli::display::Display;
use crate::daemon::{notification_message, TimerEngine, TimerEvent};
use crate::sound::{alarm_for, create_player, SoundPlayer, SoundSource};
use crate::types::Snapshot;

/// A running foreground session.
pub struct SessionRunner {
    engine: TimerEngine,
    events: mpsc::UnboundedReceiver<TimerEvent>,
    player: Arc<dyn SoundPlayer>,
    alarm_file: Option<SoundSource>,
    live: bool,
}

impl SessionRunner {
    /// Builds a runner from command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns an error for custom values given with a preset, invalid
    /// custom values or an unusable alarm file.
    pub fn from_args(args: &SessionArgs) -> Result<Self> {
        args.custom
            .check_against(args.method)
            .map_err(anyhow::Error::msg)?;

        let alarm_file = args
            .alarm
            .as_deref()
            .map(SoundSource::file)
            .transpose()
            .context("アラームファイルを読み込めません")?;

        let (tx, rx) = mpsc::unbounded_channel();
        let mut engine = TimerEngine::new(tx);
        engine.configure(args.method, args.custom_values())?;

        Ok(Self::new(engine, rx, create_player(!args.no_sound), alarm_file))
    }

    /// Wraps an already configured engine.
    pub fn new(
        engine: TimerEngine,
        events: mpsc::UnboundedReceiver<TimerEvent>,
        player: Arc<dyn SoundPlayer>,
        alarm_file: Option<SoundSource>,
    ) -> Self {
        Self {
            engine,
            events,
            player,
            alarm_file,
            live: true,
        }
    }

    /// Disables the live line; notices and alarms are kept.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.live = false;
        self
    }

    /// Starts the session and polls every `period` until every cycle is
    /// done or `shutdown` completes.
    ///
    /// Returns the final snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses to start.
    pub async fn run_until<F>(mut self, period: Duration, shutdown: F) -> Result<Snapshot>
    where
        F: Future<Output = ()>,
    {
        self.engine.start()?;

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.engine.tick();
                    let finished = self.drain_events();
                    if self.live {
                        Display::show_live(&self.engine.snapshot(), self.engine.method());
                    }
                    if finished {
                        break;
                    }
                }
                () = &mut shutdown => {
                    debug!("Session interrupted");
                    break;
                }
            }
        }

        let snapshot = self.engine.snapshot();
        if self.live {
            Display::show_session_summary(&snapshot, self.engine.method());
        }
        Ok(snapshot)
    }

    /// Handles pending events; returns true once the session has completed.
    fn drain_events(&mut self) -> bool {
        let mut finished = false;
        let mut alarm = None;

        while let Ok(event) = self.events.try_recv() {
            if let Some(message) = notification_message(&event) {
                if self.live {
                    Display::show_notification(&message);
                }
            }
            if let Some(source) = alarm_for(&event, self.alarm_file.as_ref()) {
                alarm = Some(source);
            }
            if matches!(event, TimerEvent::SessionCompleted { .. }) {
                finished = true;
            }
        }

        if let Some(source) = alarm {
            if let Err(e) = self.player.play(&source) {
                warn!("Failed to play alarm '{}': {}", source.name(), e);
            }
        }

        finished
    }
}

/// Runs `pomocycle run` until completion or Ctrl-C.
///
/// # Errors
///
/// Returns an error if the session cannot be configured or started.
pub async fn run_session(args: &SessionArgs) -> Result<Snapshot> {
    let runner = SessionRunner::from_args(args)?;
    runner
        .run_until(Duration::from_millis(args.poll_ms), async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
