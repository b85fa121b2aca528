// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission queue shared by request producers and one processing loop.
//!
//! Lifecycle state and pending requests live under a single lock, so a
//! producer can never enqueue into a queue that has already been drained.
//! The [`Notify`] only wakes the consumer; it carries no data.

use crate::connection::{Connection, PendingRequest};
use dw_core::{RequestId, WorkerState};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;
use tokio::sync::Notify;

/// Why a connection was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotRunning,
    QueueFull,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotRunning => write!(f, "worker is not running"),
            RejectReason::QueueFull => write!(f, "queue is full"),
        }
    }
}

/// A connection handed back to the caller, who now owns closing it.
#[derive(Error)]
#[error("request rejected: {reason}")]
pub struct Rejected {
    pub reason: RejectReason,
    pub connection: Box<dyn Connection>,
}

impl fmt::Debug for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct QueueInner {
    state: WorkerState,
    pending: VecDeque<PendingRequest>,
}

/// FIFO queue of pending requests plus the owning worker's lifecycle state.
#[derive(Default)]
pub struct AdmissionQueue {
    inner: Mutex<QueueInner>,
    signal: Notify,
    max_len: Option<usize>,
}

impl AdmissionQueue {
    /// Create a stopped queue, optionally bounded to `max_len` entries.
    pub fn new(max_len: Option<usize>) -> Self {
        Self {
            max_len,
            ..Self::default()
        }
    }

    pub fn state(&self) -> WorkerState {
        self.inner.lock().state
    }

    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().pending.is_empty()
    }

    /// Enter `Running` and release a waiting consumer.
    pub fn start(&self) {
        self.inner.lock().state = WorkerState::Running;
        self.signal.notify_one();
    }

    /// Enter `Stopped`, close every queued connection and wake the consumer.
    ///
    /// Returns how many queued connections were dropped.
    pub fn stop(&self) -> usize {
        self.inner.lock().state = WorkerState::Stopped;
        let dropped = self.drain_and_close();
        self.signal.notify_one();
        dropped
    }

    /// Append a connection if the queue is running and has room.
    pub fn admit(&self, connection: Box<dyn Connection>) -> Result<RequestId, Rejected> {
        let mut inner = self.inner.lock();
        if !inner.state.is_running() {
            return Err(Rejected {
                reason: RejectReason::NotRunning,
                connection,
            });
        }
        if self.max_len.is_some_and(|max| inner.pending.len() >= max) {
            return Err(Rejected {
                reason: RejectReason::QueueFull,
                connection,
            });
        }
        let pending = PendingRequest::new(connection);
        let id = pending.id.clone();
        inner.pending.push_back(pending);
        drop(inner);
        self.signal.notify_one();
        Ok(id)
    }

    /// Remove a queued request without closing it.
    pub fn evict(&self, id: &RequestId) -> Option<PendingRequest> {
        let mut inner = self.inner.lock();
        let index = inner.pending.iter().position(|p| &p.id == id)?;
        inner.pending.remove(index)
    }

    /// Take every queued request, oldest first.
    pub fn drain(&self) -> Vec<PendingRequest> {
        self.inner.lock().pending.drain(..).collect()
    }

    /// Close every queued request, suppressing close errors.
    pub fn drain_and_close(&self) -> usize {
        let drained = self.drain();
        let count = drained.len();
        for pending in drained {
            pending.close_quietly();
        }
        count
    }

    /// Take the earliest-admitted request if running and non-empty.
    pub fn try_collect(&self) -> Option<PendingRequest> {
        let mut inner = self.inner.lock();
        if !inner.state.is_running() {
            return None;
        }
        inner.pending.pop_front()
    }

    /// Wait for the earliest-admitted request.
    ///
    /// Returns `None` once the queue is stopped.
    pub async fn collect(&self) -> Option<PendingRequest> {
        loop {
            if let Some(pending) = self.try_collect() {
                return Some(pending);
            }
            if !self.state().is_running() {
                return None;
            }
            // A notify_one issued after the check leaves a permit, so this
            // cannot miss a wake-up.
            self.signal.notified().await;
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
