//! IPC Server for the interval timer daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for timer commands
//! - Integration with TimerEngine for command execution

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::timer::TimerError;
use crate::types::{CustomValues, IpcRequest, IpcResponse, Method, MethodName};

use super::timer::TimerEngine;

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,

    /// Client closed the connection without sending anything
    #[error("Connection closed by client")]
    Empty,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// A socket file left behind by a dead daemon is removed before binding;
    /// one that still accepts connections is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if another daemon is listening on the path or the
    /// socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            Self::remove_stale_socket(socket_path)?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    fn remove_stale_socket(socket_path: &Path) -> Result<()> {
        match std::os::unix::net::UnixStream::connect(socket_path) {
            Ok(_) => anyhow::bail!(
                "Daemonは既に起動しています ({})",
                socket_path.display()
            ),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::ConnectionRefused | ErrorKind::NotFound
                ) =>
            {
                debug!("Removing stale socket: {:?}", socket_path);
                std::fs::remove_file(socket_path).with_context(|| {
                    format!("Failed to remove existing socket: {:?}", socket_path)
                })
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to probe existing socket: {:?}", socket_path)),
        }
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Reads until the client shuts down its write half, bounded by a size
    /// limit and a read timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = Vec::with_capacity(512);
        let mut limited = stream.take(MAX_REQUEST_SIZE as u64 + 1);

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            limited.read_to_end(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            return Err(IpcError::Empty.into());
        }
        if n > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest =
            serde_json::from_slice(&buffer).with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;
        stream.shutdown().await.context("Failed to close response stream")?;

        Ok(())
    }

    /// Serves one connection: read a request, dispatch it, write the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be read or the response cannot
    /// be written. Rejected commands are not errors; they produce an error
    /// response.
    pub async fn serve_connection(mut stream: UnixStream, handler: &RequestHandler) -> Result<()> {
        let response = match Self::receive_request(&mut stream).await {
            Ok(request) => {
                debug!("IPC request: {:?}", request);
                handler.handle(request).await
            }
            Err(e) => {
                warn!("Invalid IPC request: {:#}", e);
                IpcResponse::error(format!("不正なリクエストです: {}", e))
            }
        };
        Self::send_response(&mut stream, &response).await
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to TimerEngine.
#[derive(Clone)]
pub struct RequestHandler {
    /// Shared reference to the timer engine
    engine: Arc<Mutex<TimerEngine>>,
}

impl RequestHandler {
    /// Creates a new request handler with the given timer engine.
    pub fn new(engine: Arc<Mutex<TimerEngine>>) -> Self {
        Self { engine }
    }

    /// Handles an IPC request and returns the appropriate response.
    ///
    /// The engine lock is held for the whole command, so each command is a
    /// critical section with respect to the ticker and other clients.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Configure { method, custom } => self.handle_configure(method, custom).await,
            IpcRequest::Edit { field, value } => {
                self.handle_edit(|engine| engine.edit_custom(field, value))
                    .await
            }
            IpcRequest::EditFields { edits } => {
                self.handle_edit(|engine| engine.edit_custom_fields(&edits))
                    .await
            }
            IpcRequest::Start => self.handle_start().await,
            IpcRequest::Stop => self.handle_stop().await,
            IpcRequest::Reset => self.handle_reset().await,
            IpcRequest::Switch { method } => self.handle_switch(method).await,
            IpcRequest::Status => self.handle_status().await,
        }
    }

    /// Handles configure.
    async fn handle_configure(
        &self,
        method: MethodName,
        custom: Option<CustomValues>,
    ) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        match engine.configure(method, custom) {
            Ok(resolved) => IpcResponse::success(
                format!("メソッドを {} に切り替えました ({})", method, resolved),
                Some(engine.response_data()),
            ),
            Err(e) => Self::rejected(e),
        }
    }

    /// Handles switch, which reuses the stored custom values.
    async fn handle_switch(&self, method: MethodName) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        match engine.switch_method(method) {
            Ok(_) => IpcResponse::success(
                format!("メソッドを {} に切り替えました ({})", method, engine.method()),
                Some(engine.response_data()),
            ),
            Err(e) => Self::rejected(e),
        }
    }

    /// Handles custom field edits; a request's edits land together or not
    /// at all.
    async fn handle_edit<F>(&self, edit: F) -> IpcResponse
    where
        F: FnOnce(&mut TimerEngine) -> Result<Method, TimerError>,
    {
        let mut engine = self.engine.lock().await;

        match edit(&mut *engine) {
            Ok(resolved) => IpcResponse::success(
                format!("カスタム設定を更新しました ({})", resolved),
                Some(engine.response_data()),
            ),
            Err(e) => Self::rejected(e),
        }
    }

    /// Handles the start command.
    async fn handle_start(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        match engine.start() {
            Ok(_) => IpcResponse::success("タイマーを開始しました", Some(engine.response_data())),
            Err(e) => Self::rejected(e),
        }
    }

    /// Handles the stop command.
    async fn handle_stop(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        match engine.stop() {
            Ok(_) => IpcResponse::success("タイマーを停止しました", Some(engine.response_data())),
            Err(e) => Self::rejected(e),
        }
    }

    /// Handles the reset command.
    async fn handle_reset(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;
        engine.reset();

        IpcResponse::success("タイマーをリセットしました", Some(engine.response_data()))
    }

    /// Handles the status command.
    ///
    /// Polls first so the reported remaining time is current even between
    /// ticker runs.
    async fn handle_status(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;
        engine.tick();

        IpcResponse::success("", Some(engine.response_data()))
    }

    fn rejected(error: TimerError) -> IpcResponse {
        if error.is_configuration_error() {
            warn!("Configuration rejected: {}", error);
        } else {
            debug!("Command rejected: {}", error);
        }
        IpcResponse::error(format!("{} ({})", error, error.suggestion()))
    }
}

// ============================================================================
// Tests
// ============================================================================
