// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON bodies of the administrative endpoints

use dw_adapters::{ArchiveAdapter, NotifyAdapter, QueryAdapter, RenderAdapter};
use dw_core::{Attributes, WorkerState};
use dw_engine::Worker;
use serde::Serialize;

/// Snapshot of one worker, attributes flattened alongside its state.
#[derive(Debug, Serialize)]
pub struct WorkerStatus {
    pub state: WorkerState,
    pub loop_active: bool,
    pub notifier_connected: bool,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl WorkerStatus {
    pub fn of<Q, R, A, N>(worker: &Worker<Q, R, A, N>) -> Self
    where
        Q: QueryAdapter,
        R: RenderAdapter,
        A: ArchiveAdapter,
        N: NotifyAdapter,
    {
        Self {
            state: worker.state(),
            loop_active: worker.is_loop_active(),
            notifier_connected: worker.connect_notifier(),
            attributes: worker.attributes(),
        }
    }
}

/// Response of `GET /status`
#[derive(Debug, Serialize)]
pub struct DaemonStatus {
    pub version: &'static str,
    pub uptime_secs: u64,
    pub workers: Vec<WorkerStatus>,
}

/// Error body for admin endpoints
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
