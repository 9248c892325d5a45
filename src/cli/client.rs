//! IPC Client for communicating with the interval timer daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::daemon::default_socket_path;
use crate::types::{CustomField, CustomValues, IpcRequest, IpcResponse, MethodName};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: usize = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for communicating with the daemon.
#[derive(Debug, Clone)]
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
}

impl IpcClient {
    /// Creates a new IPC client on the default socket path.
    pub fn new() -> Self {
        Self::with_socket_path(default_socket_path())
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Selects a method, optionally with custom values.
    pub async fn configure(
        &self,
        method: MethodName,
        custom: Option<CustomValues>,
    ) -> Result<IpcResponse> {
        self.send(&IpcRequest::Configure { method, custom }).await
    }

    /// Overwrites one custom field.
    pub async fn edit(&self, field: CustomField, value: i64) -> Result<IpcResponse> {
        self.send(&IpcRequest::Edit { field, value }).await
    }

    /// Overwrites several custom fields in one request.
    pub async fn edit_fields(&self, edits: &[(CustomField, i64)]) -> Result<IpcResponse> {
        self.send(&IpcRequest::EditFields {
            edits: edits.to_vec(),
        })
        .await
    }

    /// Switches to another method using the stored values.
    pub async fn switch(&self, method: MethodName) -> Result<IpcResponse> {
        self.send(&IpcRequest::Switch { method }).await
    }

    /// Sends a start command to the daemon.
    pub async fn start(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::Start).await
    }

    /// Sends a stop command to the daemon.
    pub async fn stop(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::Stop).await
    }

    /// Sends a reset command to the daemon.
    pub async fn reset(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::Reset).await
    }

    /// Sends a status query to the daemon.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::Status).await
    }

    /// Sends a request and turns a rejection into an error.
    ///
    /// Only connection failures are retried; a rejected command is reported
    /// as-is.
    async fn send(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let response = self.send_request_with_retry(request).await?;

        if !response.is_success() {
            anyhow::bail!("{}", response.message);
        }

        Ok(response)
    }

    /// Sends a request to the daemon, retrying only the connection.
    ///
    /// Once the request has been written it is never sent again, so a
    /// command the daemon already applied is not repeated.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let stream = self.connect_with_retry().await?;
        self.exchange(stream, request).await
    }

    /// Connects to the daemon socket with linear back-off.
    async fn connect_with_retry(&self) -> Result<UnixStream> {
        let mut attempt = 1;

        loop {
            match self.connect().await {
                Ok(stream) => return Ok(stream),
                Err(e) if attempt < MAX_RETRIES => {
                    tracing::warn!("接続失敗 (試行 {}/{}): {}", attempt, MAX_RETRIES, e);

                    let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Opens one connection with timeout.
    async fn connect(&self) -> Result<UnixStream> {
        timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("接続がタイムアウトしました")?
            .context("Daemonに接続できません。'pomocycle daemon' を起動してください")
    }

    /// Writes one request and reads the response.
    async fn exchange(&self, mut stream: UnixStream, request: &IpcRequest) -> Result<IpcResponse> {
        // Serialize request
        let request_json =
            serde_json::to_vec(request).context("リクエストのシリアライズに失敗しました")?;

        // Send request with timeout
        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(&request_json),
        )
        .await
        .context("書き込みがタイムアウトしました")?
        .context("リクエストの送信に失敗しました")?;

        // Shutdown write side to signal end of request
        stream
            .shutdown()
            .await
            .context("シャットダウンに失敗しました")?;

        // Read response with timeout
        let mut buffer = Vec::new();
        let mut limited = (&mut stream).take(MAX_RESPONSE_SIZE as u64);
        let n = timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            limited.read_to_end(&mut buffer),
        )
        .await
        .context("読み込みがタイムアウトしました")?
        .context("レスポンスの受信に失敗しました")?;

        if n == 0 {
            anyhow::bail!("Daemonからの応答がありませんでした");
        }

        serde_json::from_slice(&buffer).context("レスポンスのパースに失敗しました")
    }
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
