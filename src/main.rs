//! Pomocycle CLI - a work/break interval timer
//!
//! Alternates focused work phases with breaks for a fixed number of cycles:
//! - pomodoro: 25 minutes of work, 5 minutes of break, 4 cycles
//! - long-work / short-work presets, or custom values
//! - foreground `run`, or a daemon controlled over a Unix socket

use anyhow::Result;
use clap::{CommandFactory, Parser};

use pomocycle::cli::{run_session, Cli, Commands, Display, IpcClient, MethodArgs, SessionArgs};
use pomocycle::daemon::{run_daemon, DaemonConfig};
use pomocycle::types::{CustomValues, MethodName};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let client = cli
        .socket
        .clone()
        .map(IpcClient::with_socket_path)
        .unwrap_or_default();

    match cli.command {
        Some(Commands::Start) => {
            let response = client.start().await?;
            Display::show_start_success(&response);
        }
        Some(Commands::Stop) => {
            let response = client.stop().await?;
            Display::show_stop_success(&response);
        }
        Some(Commands::Reset) => {
            let response = client.reset().await?;
            Display::show_reset_success(&response);
        }
        Some(Commands::Status) => {
            let response = client.status().await?;
            Display::show_status(&response);
        }
        Some(Commands::Method(args)) => {
            select_method(&client, &args).await?;
        }
        Some(Commands::Edit { field, value }) => {
            let response = client.edit(field, value).await?;
            Display::show_method_success(&response);
        }
        Some(Commands::Methods) => {
            // Mark the daemon's selection only when one is listening
            let selected = if client.socket_path().exists() {
                client
                    .status()
                    .await
                    .ok()
                    .and_then(|r| r.data)
                    .and_then(|d| d.method)
                    .and_then(|m| m.parse::<MethodName>().ok())
            } else {
                None
            };
            Display::show_methods(selected);
        }
        Some(Commands::Run(args)) => {
            run_session(&args).await?;
        }
        Some(Commands::Daemon(args)) => {
            let socket_path = client.socket_path().to_path_buf();
            run_daemon(daemon_config(socket_path, &args)?).await?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Applies `method <name> [--work --break --cycles]` on the daemon.
///
/// All three values replace the custom method at once; a subset is applied
/// in one request on top of the daemon's stored values.
async fn select_method(client: &IpcClient, args: &MethodArgs) -> Result<()> {
    args.custom
        .check_against(args.name)
        .map_err(anyhow::Error::msg)?;

    let custom = &args.custom;
    let response = match (custom.work, custom.break_minutes, custom.cycles) {
        (Some(work), Some(rest), Some(cycles)) => {
            let values = CustomValues::new(work.into(), rest.into(), cycles.into());
            client.configure(args.name, Some(values)).await?
        }
        _ if custom.is_empty() => client.configure(args.name, None).await?,
        _ => client.edit_fields(&custom.edits()).await?,
    };

    Display::show_method_success(&response);
    Ok(())
}

/// Builds the daemon configuration from `daemon` arguments.
fn daemon_config(socket_path: std::path::PathBuf, args: &SessionArgs) -> Result<DaemonConfig> {
    args.custom
        .check_against(args.method)
        .map_err(anyhow::Error::msg)?;

    let mut config = DaemonConfig::with_socket_path(socket_path).poll_ms(args.poll_ms);
    config.method = args.method;
    config.custom = args.custom_values();
    config.sound = !args.no_sound;
    config.alarm = args.alarm.clone();
    Ok(config)
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
