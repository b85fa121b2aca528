// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake-backed workers for daemon tests.

use crate::workers::WorkerRegistry;
use dw_adapters::{FakeArchiveAdapter, FakeNotifyAdapter, FakeQueryAdapter, FakeRenderAdapter};
use dw_core::{MultipleRows, SqlCredentials};
use dw_engine::{Worker, WorkerConfig, WorkerDeps};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub(crate) type FakeRegistry =
    WorkerRegistry<FakeQueryAdapter, FakeRenderAdapter, FakeArchiveAdapter, FakeNotifyAdapter>;

pub(crate) struct Fakes {
    pub query: FakeQueryAdapter,
    pub render: FakeRenderAdapter,
    pub archive: FakeArchiveAdapter,
    pub notifier: FakeNotifyAdapter,
}

/// Registry with stopped `Invoice` and `CreditNote` workers sharing one set of fakes.
pub(crate) fn fake_registry(output_dir: &Path) -> (Arc<FakeRegistry>, Fakes) {
    let fakes = Fakes {
        query: FakeQueryAdapter::new(),
        render: FakeRenderAdapter::new(),
        archive: FakeArchiveAdapter::new(),
        notifier: FakeNotifyAdapter::new(),
    };
    let workers = ["Invoice", "CreditNote"].map(|kind| {
        Worker::new(
            WorkerConfig {
                kind: kind.to_string(),
                template_path: PathBuf::from(format!("/templates/{kind}.rpt")),
                table: "OINV".to_string(),
                output_dir: output_dir.to_path_buf(),
                credentials: SqlCredentials::default(),
                multiple_rows: MultipleRows::First,
                request_timeout: None,
                max_queue: None,
            },
            WorkerDeps {
                query: fakes.query.clone(),
                render: fakes.render.clone(),
                archive: fakes.archive.clone(),
                notifier: fakes.notifier.clone(),
            },
        )
    });
    (Arc::new(WorkerRegistry::new(workers)), fakes)
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
