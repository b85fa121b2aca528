// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of configured workers, one per document kind

use dw_adapters::{ArchiveAdapter, NotifyAdapter, QueryAdapter, RenderAdapter};
use dw_engine::{Worker, WorkerError};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no worker serves document kind {0:?}")]
    UnknownKind(String),
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

pub struct WorkerRegistry<Q, R, A, N> {
    workers: BTreeMap<String, Arc<Worker<Q, R, A, N>>>,
}

impl<Q, R, A, N> WorkerRegistry<Q, R, A, N>
where
    Q: QueryAdapter,
    R: RenderAdapter,
    A: ArchiveAdapter,
    N: NotifyAdapter,
{
    pub fn new(workers: impl IntoIterator<Item = Worker<Q, R, A, N>>) -> Self {
        Self {
            workers: workers
                .into_iter()
                .map(|w| (w.kind().to_string(), Arc::new(w)))
                .collect(),
        }
    }

    pub fn get(&self, kind: &str) -> Option<&Arc<Worker<Q, R, A, N>>> {
        self.workers.get(kind)
    }

    /// Workers ordered by document kind
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Worker<Q, R, A, N>>> {
        self.workers.values()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Put `kind`'s worker in `Running`, its loop on a spawned task.
    ///
    /// Fails with `LoopActive` if the worker is already running.
    pub fn start(&self, kind: &str) -> Result<(), RegistryError> {
        self.lookup(kind)?.spawn()?;
        Ok(())
    }

    pub fn stop(&self, kind: &str) -> Result<(), RegistryError> {
        self.lookup(kind)?.stop();
        Ok(())
    }

    /// Stop every running worker.
    pub fn stop_all(&self) {
        for worker in self.iter().filter(|w| w.state().is_running()) {
            worker.stop();
        }
    }

    /// Wait until no processing loop is active, up to `limit`.
    ///
    /// Returns false if some loop was still finishing a request.
    pub async fn wait_idle(&self, limit: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            if !self.iter().any(|w| w.is_loop_active()) {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    fn lookup(&self, kind: &str) -> Result<&Arc<Worker<Q, R, A, N>>, RegistryError> {
        self.workers
            .get(kind)
            .ok_or_else(|| RegistryError::UnknownKind(kind.to_string()))
    }
}

#[cfg(test)]
#[path = "workers_tests.rs"]
mod tests;
