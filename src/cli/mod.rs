//! CLI module for the interval timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `client`: IPC client for daemon communication
//! - `display`: Output formatting and display logic
//! - `session`: Foreground session driven from the terminal

pub mod client;
pub mod commands;
pub mod display;
pub mod session;

pub use client::IpcClient;
pub use commands::{Cli, Commands, CustomArgs, MethodArgs, SessionArgs};
pub use display::Display;
pub use session::{run_session, SessionRunner};
