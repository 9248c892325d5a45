//! Daemon module for the interval timer.
//!
//! This module contains the background service:
//! - `timer`: Timer engine wiring the core to a clock and an event channel
//! - `ipc`: Unix socket server and request dispatch
//! - `notifier`: Event consumer that logs and rings alarms
//!
//! One engine is shared by the ticker task and every client connection
//! behind a `tokio::sync::Mutex`, so commands and polls never interleave.

pub mod ipc;
pub mod notifier;
pub mod timer;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, Mutex};
use tokio::time::Duration;
use tracing::{info, warn};

use crate::sound::{create_player, SoundSource};
use crate::types::{CustomValues, MethodName};

pub use ipc::{IpcError, IpcServer, RequestHandler};
pub use notifier::{notification_message, run_notifier};
pub use timer::{TimerEngine, TimerEvent};

// ============================================================================
// Configuration
// ============================================================================

/// Socket path relative to the home directory.
const DEFAULT_SOCKET_PATH: &str = ".pomocycle/pomocycle.sock";

/// Default polling period in milliseconds.
pub const DEFAULT_POLL_MS: u64 = 100;

/// Shortest accepted polling period in milliseconds.
pub const MIN_POLL_MS: u64 = 10;

/// Longest accepted polling period in milliseconds.
pub const MAX_POLL_MS: u64 = 1000;

/// Returns `~/.pomocycle/pomocycle.sock`, or a path in the temp directory
/// when no home directory can be determined.
pub fn default_socket_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(DEFAULT_SOCKET_PATH),
        None => {
            warn!("Home directory not found, using the temp directory for the socket");
            std::env::temp_dir().join("pomocycle.sock")
        }
    }
}

/// Daemon settings, filled from command-line flags and environment.
#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    /// Unix socket the daemon listens on
    pub socket_path: PathBuf,
    /// How often the engine is polled
    pub poll_interval: Duration,
    /// Method selected at startup
    pub method: MethodName,
    /// Custom values applied at startup (used when `method` is custom)
    pub custom: Option<CustomValues>,
    /// Whether alarms are audible
    pub sound: bool,
    /// Alarm file replacing the built-in chimes
    pub alarm: Option<PathBuf>,
}

impl DaemonConfig {
    /// Creates the default configuration listening on `socket_path`.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            method: MethodName::default(),
            custom: None,
            sound: true,
            alarm: None,
        }
    }

    /// Sets the polling period, clamped to the accepted range.
    #[must_use]
    pub fn poll_ms(mut self, millis: u64) -> Self {
        self.poll_interval = Duration::from_millis(millis.clamp(MIN_POLL_MS, MAX_POLL_MS));
        self
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self::with_socket_path(default_socket_path())
    }
}

// ============================================================================
// Daemon
// ============================================================================

/// Runs the daemon until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the startup configuration is invalid or the socket
/// cannot be bound.
pub async fn run_daemon(config: DaemonConfig) -> Result<()> {
    serve(config, shutdown_signal()).await
}

/// Runs the daemon until `shutdown` completes.
///
/// # Errors
///
/// Returns an error if the startup configuration is invalid or the socket
/// cannot be bound.
pub async fn serve<F>(config: DaemonConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let alarm_file = config
        .alarm
        .as_deref()
        .map(SoundSource::file)
        .transpose()
        .context("アラームファイルを読み込めません")?;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let mut engine = TimerEngine::new(event_tx);
    engine
        .configure(config.method, config.custom)
        .context("起動時のメソッド設定が不正です")?;
    let engine = Arc::new(Mutex::new(engine));

    let server = IpcServer::new(&config.socket_path)?;
    let handler = RequestHandler::new(engine.clone());

    let ticker = tokio::spawn(TimerEngine::run(engine.clone(), config.poll_interval));
    let notifier = tokio::spawn(run_notifier(
        event_rx,
        create_player(config.sound),
        alarm_file,
    ));

    info!(
        socket = %server.socket_path().display(),
        poll_ms = config.poll_interval.as_millis() as u64,
        "Daemon started"
    );

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accepted = server.accept() => match accepted {
                Ok(stream) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        if let Err(e) = IpcServer::serve_connection(stream, &handler).await {
                            warn!("Connection failed: {:#}", e);
                        }
                    });
                }
                Err(e) => warn!("{:#}", e),
            },
            () = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }

    ticker.abort();
    notifier.abort();
    Ok(())
}

/// Completes on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            warn!("Failed to register SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}
