// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document worker: admission, serial processing and lifecycle

mod pipeline;

pub use pipeline::FILE_NAME_HEADER;

use crate::connection::{Connection, PendingRequest};
use crate::error::{RequestError, WorkerError};
use crate::queue::{AdmissionQueue, Rejected};
use chrono::Utc;
use dw_adapters::{ArchiveAdapter, NotifyAdapter, QueryAdapter, RenderAdapter};
use dw_core::{
    AttributeKey, AttributeValue, Attributes, EventLog, MultipleRows, RequestId, SqlCredentials,
    WorkerState,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Worker configuration, frozen at construction
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Document kind served, e.g. `Invoice`
    pub kind: String,
    pub template_path: PathBuf,
    /// Table the lookup query reads from
    pub table: String,
    /// Parent of the per-request scratch directories
    pub output_dir: PathBuf,
    pub credentials: SqlCredentials,
    pub multiple_rows: MultipleRows,
    pub request_timeout: Option<Duration>,
    pub max_queue: Option<usize>,
}

/// Worker adapter dependencies
#[derive(Clone)]
pub struct WorkerDeps<Q, R, A, N> {
    pub query: Q,
    pub render: R,
    pub archive: A,
    pub notifier: N,
}

/// Serves one document kind, one request at a time.
pub struct Worker<Q, R, A, N> {
    config: WorkerConfig,
    deps: WorkerDeps<Q, R, A, N>,
    queue: AdmissionQueue,
    events: EventLog,
    /// Whether a processing loop owns the queue. Start, stop and loop exit
    /// all decide under this lock.
    loop_active: Mutex<bool>,
}

/// Releases loop ownership if the loop future is dropped mid-flight.
struct LoopGuard<'a> {
    active: &'a Mutex<bool>,
    armed: bool,
}

impl Drop for LoopGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.active.lock() = false;
        }
    }
}

impl<Q, R, A, N> Worker<Q, R, A, N>
where
    Q: QueryAdapter,
    R: RenderAdapter,
    A: ArchiveAdapter,
    N: NotifyAdapter,
{
    /// Create a stopped worker
    pub fn new(config: WorkerConfig, deps: WorkerDeps<Q, R, A, N>) -> Self {
        Self {
            queue: AdmissionQueue::new(config.max_queue),
            config,
            deps,
            events: EventLog::new(),
            loop_active: Mutex::new(false),
        }
    }

    pub fn kind(&self) -> &str {
        &self.config.kind
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn state(&self) -> WorkerState {
        self.queue.state()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Live handle onto the worker's event log
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Whether a processing loop is currently running or finishing
    pub fn is_loop_active(&self) -> bool {
        *self.loop_active.lock()
    }

    /// Check that the notifier can deliver
    pub fn connect_notifier(&self) -> bool {
        self.deps.notifier.connect()
    }

    /// Attribute map for administrative display
    pub fn attributes(&self) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(
            AttributeKey::DocumentKind,
            AttributeValue::Text(self.config.kind.clone()),
        );
        attributes.insert(
            AttributeKey::TemplatePath,
            AttributeValue::Path(self.config.template_path.clone()),
        );
        attributes.insert(
            AttributeKey::TableName,
            AttributeValue::Text(self.config.table.clone()),
        );
        attributes.insert(
            AttributeKey::QueueLength,
            AttributeValue::Count(self.queue.len()),
        );
        attributes.insert(
            AttributeKey::Events,
            AttributeValue::Events(self.events.clone()),
        );
        attributes
    }

    /// Queue a connection for processing.
    ///
    /// A rejected connection is handed back; the caller closes it.
    pub fn admit(&self, connection: Box<dyn Connection>) -> Result<RequestId, Rejected> {
        match self.queue.admit(connection) {
            Ok(id) => {
                tracing::debug!(kind = %self.config.kind, %id, queued = self.queue.len(), "admitted");
                Ok(id)
            }
            Err(rejected) => {
                tracing::debug!(kind = %self.config.kind, reason = %rejected.reason, "rejected");
                Err(rejected)
            }
        }
    }

    /// Remove a queued request, e.g. after its client went away.
    pub fn evict(&self, id: &RequestId) -> Option<PendingRequest> {
        let evicted = self.queue.evict(id);
        if evicted.is_some() {
            tracing::debug!(kind = %self.config.kind, %id, "evicted");
        }
        evicted
    }

    /// Enter `Running` and process requests until stopped.
    ///
    /// Resolves once the worker is stopped and the in-flight request, if
    /// any, has finished. When a loop from an earlier start is still winding
    /// down, that loop resumes serving and this resolves at once.
    pub async fn start(self: Arc<Self>) -> Result<(), WorkerError> {
        if self.begin()? {
            self.run().await;
        }
        Ok(())
    }

    /// Enter `Running` now and drive the processing loop on a spawned task.
    pub fn spawn(self: &Arc<Self>) -> Result<(), WorkerError> {
        if self.begin()? {
            let worker = Arc::clone(self);
            tokio::spawn(async move { worker.run().await });
        }
        Ok(())
    }

    /// Stop accepting work and close every queued connection.
    ///
    /// An in-flight request runs to completion. Stopping a stopped worker
    /// does nothing.
    pub fn stop(&self) {
        let _lifecycle = self.loop_active.lock();
        if !self.queue.state().is_running() {
            tracing::debug!(kind = %self.config.kind, "already stopped");
            return;
        }
        let dropped = self.queue.stop();
        if dropped > 0 {
            self.events
                .append(format!("dropped {dropped} queued request(s) on stop"));
        }
        self.events.append("stopped");
        tracing::info!(kind = %self.config.kind, dropped, "worker stopped");
    }

    /// Enter `Running`; true when the caller must drive a new loop.
    fn begin(&self) -> Result<bool, WorkerError> {
        let mut active = self.loop_active.lock();
        if *active && self.queue.state().is_running() {
            return Err(WorkerError::LoopActive(self.config.kind.clone()));
        }
        self.queue.start();
        tracing::info!(kind = %self.config.kind, resumed = *active, "worker started");
        let needs_loop = !*active;
        *active = true;
        Ok(needs_loop)
    }

    async fn run(&self) {
        let mut guard = LoopGuard {
            active: &self.loop_active,
            armed: true,
        };
        loop {
            if let Some(pending) = self.queue.collect().await {
                self.serve(pending).await;
                continue;
            }
            let restarted = {
                let mut active = self.loop_active.lock();
                let restarted = self.queue.state().is_running();
                if !restarted {
                    *active = false;
                    guard.armed = false;
                }
                restarted
            };
            if !restarted {
                break;
            }
        }
        tracing::info!(kind = %self.config.kind, "processing loop exited");
    }

    async fn serve(&self, pending: PendingRequest) {
        let PendingRequest {
            id,
            admitted_at,
            mut connection,
        } = pending;
        let span = tracing::info_span!("request", %id, kind = %self.config.kind);

        async move {
            let waited_ms = (Utc::now() - admitted_at).num_milliseconds();
            tracing::debug!(waited_ms, "serving");

            let scratch = self.config.output_dir.join(id.as_str());
            let outcome = self.generate_within_deadline(&scratch, connection.as_mut()).await;
            remove_scratch(&scratch).await;

            let closed = connection.close();
            let outcome = match (outcome, closed) {
                (Ok(file_name), Ok(())) => Ok(file_name),
                (Ok(_), Err(e)) => Err(RequestError::Transport(e)),
                (Err(e), closed) => {
                    if let Err(close_error) = closed {
                        tracing::debug!(error = %close_error, "closing failed request");
                    }
                    Err(e)
                }
            };

            match outcome {
                Ok(file_name) => self.report_success(&file_name).await,
                Err(e) => self.report_failure(&e).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn generate_within_deadline(
        &self,
        scratch: &Path,
        connection: &mut dyn Connection,
    ) -> Result<String, RequestError> {
        match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.generate(scratch, connection))
                .await
                .unwrap_or(Err(RequestError::Timeout(limit))),
            None => self.generate(scratch, connection).await,
        }
    }

    async fn report_success(&self, file_name: &str) {
        tracing::info!(file_name, "sent");
        self.events.append(format!("sent {file_name}"));
        self.notify(&format!("sent: {file_name}")).await;
    }

    async fn report_failure(&self, error: &RequestError) {
        let message = error.to_string();
        tracing::warn!(error = %message, "request failed");
        self.events.append(message.as_str());
        self.notify(&message).await;
    }

    async fn notify(&self, message: &str) {
        if let Err(e) = self.deps.notifier.notify(&self.config.kind, message).await {
            tracing::warn!(error = %e, "notification failed");
        }
    }
}

async fn remove_scratch(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to remove scratch directory")
        }
    }
}

#[cfg(test)]
#[path = "../worker_tests/mod.rs"]
mod tests;
