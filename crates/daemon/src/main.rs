// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document Worker Daemon (dwd)
//!
//! Serves generated documents over HTTP.
//!
//! Architecture:
//! - Listener: axum server admitting each document request to its worker
//! - Workers: one processing loop per document kind, serving requests serially

use std::sync::Arc;

use dw_daemon::lifecycle::{self, LifecycleError, Paths, StartupResult};
use dw_daemon::listener::{self, AppState};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("dwd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("dwd {}", env!("CARGO_PKG_VERSION"));
                println!("Document Worker Daemon - serves generated documents over HTTP");
                println!();
                println!("USAGE:");
                println!("    dwd");
                println!();
                println!("Configuration is read from $DW_CONFIG or <state dir>/config.toml.");
                println!("The state dir is $DW_STATE_DIR, $XDG_STATE_HOME/dw or");
                println!("~/.local/state/dw. DW_LISTEN overrides the listen address.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: dwd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let paths = Paths::resolve()?;

    // Write startup marker to log (before tracing setup)
    write_startup_marker(&paths)?;

    let log_guard = setup_logging(&paths)?;

    info!("Starting document worker daemon");

    let StartupResult { daemon, listener } = match lifecycle::startup(&paths).await {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&paths.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("dwd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&paths, &e);
            error!("Failed to start daemon: {}", e);
            eprintln!("dwd: {e}");
            drop(log_guard);
            return Err(e.into());
        }
    };

    let app = listener::router(AppState {
        registry: Arc::clone(&daemon.registry),
        started: daemon.started,
    });

    // Workers stop before the server so every waiting handler gets its response.
    let shutdown_notify = Arc::new(Notify::new());
    let server = {
        let shutdown_notify = Arc::clone(&shutdown_notify);
        tokio::spawn(listener::serve(listener, app, async move {
            shutdown_notify.notified().await;
        }))
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("Daemon ready, listening on {}", daemon.config.listen);
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }

    daemon.shutdown().await;
    shutdown_notify.notify_one();
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("HTTP server failed: {}", e),
        Err(e) => error!("HTTP server task failed: {}", e),
    }

    info!("Daemon stopped");
    Ok(())
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- dwd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- dwd: starting (pid: ";

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(paths: &Paths) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = paths.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(paths: &Paths, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    paths: &Paths,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_appender = tracing_appender::rolling::never(
        paths.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        paths.log_path.file_name().ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
