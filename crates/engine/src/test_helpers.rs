// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine crate.

use crate::connection::{Connection, TransportError};
use crate::{Worker, WorkerConfig, WorkerDeps};
use async_trait::async_trait;
use dw_adapters::{FakeArchiveAdapter, FakeNotifyAdapter, FakeQueryAdapter, FakeRenderAdapter};
use dw_core::{MultipleRows, SqlCredentials};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Everything a fake connection observed.
#[derive(Debug, Default)]
pub(crate) struct ConnectionLog {
    pub reads: usize,
    pub headers: Vec<(String, String)>,
    pub written: Vec<u8>,
    pub flushes: usize,
    pub closes: usize,
}

/// In-memory connection; clones share one [`ConnectionLog`].
#[derive(Clone, Default)]
pub(crate) struct FakeConnection {
    body: Arc<Vec<u8>>,
    log: Arc<Mutex<ConnectionLog>>,
    fail_close: bool,
}

impl FakeConnection {
    pub fn with_body(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: Arc::new(body.into()),
            ..Self::default()
        }
    }

    /// A connection whose close reports a transport failure
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn boxed(&self) -> Box<dyn Connection> {
        Box::new(self.clone())
    }

    pub fn reads(&self) -> usize {
        self.log.lock().reads
    }

    pub fn closes(&self) -> usize {
        self.log.lock().closes
    }

    pub fn written(&self) -> Vec<u8> {
        self.log.lock().written.clone()
    }

    pub fn flushes(&self) -> usize {
        self.log.lock().flushes
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.log
            .lock()
            .headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// Untouched means never read and never closed.
    pub fn untouched(&self) -> bool {
        let log = self.log.lock();
        log.reads == 0 && log.closes == 0
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn read_body(&mut self) -> Result<Vec<u8>, TransportError> {
        self.log.lock().reads += 1;
        Ok(self.body.as_ref().clone())
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.log
            .lock()
            .headers
            .push((name.to_string(), value.to_string()));
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.log.lock().written.extend_from_slice(bytes);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), TransportError> {
        self.log.lock().flushes += 1;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), TransportError> {
        self.log.lock().closes += 1;
        if self.fail_close {
            return Err(TransportError::Closed);
        }
        Ok(())
    }
}

pub(crate) type TestWorker =
    Worker<FakeQueryAdapter, FakeRenderAdapter, FakeArchiveAdapter, FakeNotifyAdapter>;

/// Test context holding a worker, its fakes and its scratch directory.
pub(crate) struct TestContext {
    pub worker: Arc<TestWorker>,
    pub query: FakeQueryAdapter,
    pub render: FakeRenderAdapter,
    pub archive: FakeArchiveAdapter,
    pub notifier: FakeNotifyAdapter,
    pub output_dir: PathBuf,
    _dir: TempDir,
}

pub(crate) fn test_config(output_dir: PathBuf) -> WorkerConfig {
    WorkerConfig {
        kind: "Invoice".to_string(),
        template_path: PathBuf::from("/templates/invoice.rpt"),
        table: "OINV".to_string(),
        output_dir,
        credentials: SqlCredentials {
            server: "db.local".to_string(),
            database: "sales".to_string(),
            user: "reader".to_string(),
            password: "secret".to_string(),
        },
        multiple_rows: MultipleRows::First,
        request_timeout: None,
        max_queue: None,
    }
}

/// Create a stopped worker backed by fakes.
pub(crate) fn setup() -> TestContext {
    setup_with(|_| {})
}

/// Create a stopped worker, adjusting its config first.
pub(crate) fn setup_with(configure: impl FnOnce(&mut WorkerConfig)) -> TestContext {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("out");
    let mut config = test_config(output_dir.clone());
    configure(&mut config);

    let query = FakeQueryAdapter::new();
    let render = FakeRenderAdapter::new();
    let archive = FakeArchiveAdapter::new();
    let notifier = FakeNotifyAdapter::new();
    let worker = Arc::new(Worker::new(
        config,
        WorkerDeps {
            query: query.clone(),
            render: render.clone(),
            archive: archive.clone(),
            notifier: notifier.clone(),
        },
    ));

    TestContext {
        worker,
        query,
        render,
        archive,
        notifier,
        output_dir,
        _dir: dir,
    }
}

/// Spawn the processing loop and wait until the worker is running.
pub(crate) async fn spawn_loop(
    ctx: &TestContext,
) -> tokio::task::JoinHandle<Result<(), crate::WorkerError>> {
    let handle = tokio::spawn(Arc::clone(&ctx.worker).start());
    let worker = Arc::clone(&ctx.worker);
    wait_until("worker running", move || worker.state().is_running()).await;
    handle
}

/// Poll `condition` until it holds, failing the test after five seconds.
pub(crate) async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}
