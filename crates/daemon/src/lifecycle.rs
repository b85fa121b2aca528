// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dw_adapters::{
    CommandArchiveAdapter, CommandQueryAdapter, CommandRenderAdapter, TracedArchive, TracedQuery,
    TracedRender,
};
use dw_engine::{Worker, WorkerConfig, WorkerDeps};
use fs2::FileExt;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{ConfigError, DaemonConfig};
use crate::env;
use crate::notifier::DaemonNotifier;
use crate::workers::WorkerRegistry;

/// Production worker with traced command adapters
pub type DaemonWorker = Worker<
    TracedQuery<CommandQueryAdapter>,
    TracedRender<CommandRenderAdapter>,
    TracedArchive<CommandArchiveAdapter>,
    DaemonNotifier,
>;

pub type DaemonRegistry = WorkerRegistry<
    TracedQuery<CommandQueryAdapter>,
    TracedRender<CommandRenderAdapter>,
    TracedArchive<CommandArchiveAdapter>,
    DaemonNotifier,
>;

/// How long shutdown waits for in-flight requests
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Filesystem locations used by the daemon
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root state directory (e.g. ~/.local/state/dw)
    pub state_dir: PathBuf,
    pub config_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
}

impl Paths {
    /// Resolve paths from the environment.
    pub fn resolve() -> Result<Self, LifecycleError> {
        let state_dir = env::state_dir()?;
        Ok(Self::under(state_dir))
    }

    /// Paths rooted at `state_dir`, honoring a `DW_CONFIG` override.
    pub fn under(state_dir: PathBuf) -> Self {
        Self {
            config_path: env::config_path().unwrap_or_else(|| state_dir.join("config.toml")),
            lock_path: state_dir.join("dwd.pid"),
            log_path: state_dir.join("dwd.log"),
            state_dir,
        }
    }

    /// Default parent of per-request scratch directories
    pub fn default_output_dir(&self) -> PathBuf {
        self.state_dir.join("output")
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,
    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to bind {addr}: {source}")]
    BindFailed {
        addr: String,
        source: std::io::Error,
    },
}

/// Running daemon state
pub struct Daemon {
    pub config: DaemonConfig,
    pub paths: Paths,
    pub registry: Arc<DaemonRegistry>,
    pub started: Instant,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
}

/// Result of startup: the daemon plus the bound listener to serve on
pub struct StartupResult {
    pub daemon: Daemon,
    pub listener: TcpListener,
}

/// Acquire the lock, load config, build workers and bind the listener.
///
/// Workers marked `autostart` are running when this returns.
pub async fn startup(paths: &Paths) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&paths.state_dir)?;

    // Don't truncate before holding the lock; that would wipe the running
    // daemon's PID.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&paths.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    let mut config = DaemonConfig::load(&paths.config_path)?;
    if let Some(listen) = env::listen_override() {
        config.listen = listen;
    }

    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| paths.default_output_dir());
    std::fs::create_dir_all(&output_dir)?;

    let registry = Arc::new(WorkerRegistry::new(build_workers(&config, &output_dir)));

    let listener = TcpListener::bind(&config.listen)
        .await
        .map_err(|source| LifecycleError::BindFailed {
            addr: config.listen.clone(),
            source,
        })?;

    for section in config.workers.iter().filter(|w| w.autostart) {
        if let Some(worker) = registry.get(&section.kind) {
            if !worker.connect_notifier() {
                warn!(kind = %section.kind, "notifier unavailable, status pushes are disabled");
            }
        }
        if let Err(e) = registry.start(&section.kind) {
            warn!(kind = %section.kind, error = %e, "autostart failed");
        }
    }

    info!(
        listen = %config.listen,
        workers = registry.len(),
        "daemon started"
    );

    Ok(StartupResult {
        daemon: Daemon {
            config,
            paths: paths.clone(),
            registry,
            started: Instant::now(),
            lock_file,
        },
        listener,
    })
}

/// One worker per `[[worker]]` section, all sharing the configured adapters.
pub fn build_workers(config: &DaemonConfig, output_dir: &std::path::Path) -> Vec<DaemonWorker> {
    let mut query = CommandQueryAdapter::new(config.query.program.clone(), config.query.args.clone());
    if let Some(timeout) = config.query.timeout() {
        query = query.with_timeout(timeout);
    }
    let mut render = CommandRenderAdapter::new(
        config.render.program.clone(),
        config.render.args.clone(),
        config.database.clone(),
    );
    if let Some(timeout) = config.render.timeout() {
        render = render.with_timeout(timeout);
    }
    let mut archive =
        CommandArchiveAdapter::new(config.archive.program.clone(), config.archive.args.clone());
    if let Some(timeout) = config.archive.timeout() {
        archive = archive.with_timeout(timeout);
    }
    let notifier = DaemonNotifier::from_config(&config.notify);

    config
        .workers
        .iter()
        .map(|section| {
            Worker::new(
                WorkerConfig {
                    kind: section.kind.clone(),
                    template_path: section.template.clone(),
                    table: section.table.clone(),
                    output_dir: output_dir.to_path_buf(),
                    credentials: config.database.clone(),
                    multiple_rows: section.multiple_rows,
                    request_timeout: section.request_timeout(),
                    max_queue: section.max_queue,
                },
                WorkerDeps {
                    query: TracedQuery::new(query.clone()),
                    render: TracedRender::new(render.clone()),
                    archive: TracedArchive::new(archive.clone()),
                    notifier: notifier.clone(),
                },
            )
        })
        .collect()
}

impl Daemon {
    /// Stop every worker and wait for in-flight requests to finish.
    pub async fn shutdown(self) {
        info!("Shutting down daemon...");
        self.registry.stop_all();
        if !self.registry.wait_idle(SHUTDOWN_GRACE).await {
            warn!("in-flight requests still running at shutdown");
        }

        if self.paths.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.paths.lock_path) {
                warn!("Failed to remove lock file: {}", e);
            }
        }
        info!("Daemon shutdown complete");
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
