// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use dtnd::agent::{ChannelSender, RestAgent, SecureTokenGenerator};
use dtnd::config::DaemonConfig;
use dtnd::rest;
use dtnd::AppContext;

#[derive(Parser)]
#[command(
    name = "dtnd",
    about = "dtnd — DTN node daemon, client session and mailbox agent",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a TOML configuration file
    #[arg(long, env = "DTND_CONFIG")]
    config: Option<PathBuf>,

    /// Client agent API port
    #[arg(long, env = "DTND_PORT")]
    port: Option<u16>,

    /// Bind address for the client agent API (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "DTND_BIND")]
    bind_address: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DTND_LOG")]
    log: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "DTND_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the daemon in the foreground (default when no subcommand given).
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Some(Command::Serve) | None => serve(args).await,
    }
}

async fn serve(args: Args) -> Result<()> {
    let mut config = DaemonConfig::load(args.config.as_deref())?;
    config.apply_overrides(args.port, args.bind_address, args.log);

    let log_file = args.log_file.or_else(|| config.log_file.clone());
    let _log_guard = setup_logging(&config.log_level, log_file.as_deref(), &config.log_format);

    info!(version = env!("CARGO_PKG_VERSION"), "starting dtnd");

    // Submitted bundles leave through this channel; the forwarding core is
    // an external collaborator and this drain task is its ingress seam.
    let (sender, mut dispatch_rx) = ChannelSender::new(config.agent.dispatch_queue);
    tokio::spawn(async move {
        while let Some(bundle) = dispatch_rx.recv().await {
            info!(
                bundle = %bundle.id(),
                destination = %bundle.primary_block.destination,
                "bundle handed to forwarding core"
            );
        }
        debug!("dispatch channel closed");
    });

    let agent = Arc::new(RestAgent::new(
        Arc::new(SecureTokenGenerator),
        Arc::new(sender),
    ));

    let ctx = Arc::new(AppContext {
        config: Arc::new(config),
        agent,
        started_at: std::time::Instant::now(),
    });

    rest::start_rest_server(ctx).await
}

/// Initialise tracing to stdout and, optionally, a daily-rotated log file.
/// Returns the appender guard that must stay alive for the file writer to
/// flush.
fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("dtnd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            // Fall back to stdout-only — don't panic on a bad log path.
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking))
                .init();
        }
        Some(guard)
    } else {
        if use_json {
            tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        } else {
            tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        }
        None
    }
}
