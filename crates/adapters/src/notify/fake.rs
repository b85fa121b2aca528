// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notification adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Recorded notification
#[derive(Debug, Clone)]
pub struct NotifyCall {
    pub title: String,
    pub message: String,
}

struct FakeNotifyState {
    calls: Vec<NotifyCall>,
    connected: bool,
}

/// Fake notification adapter for testing
#[derive(Clone)]
pub struct FakeNotifyAdapter {
    inner: Arc<Mutex<FakeNotifyState>>,
}

impl Default for FakeNotifyAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeNotifyState {
                calls: Vec::new(),
                connected: true,
            })),
        }
    }
}

impl FakeNotifyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `connect()` report failure
    pub fn set_disconnected(&self) {
        self.inner.lock().connected = false;
    }

    /// Get all recorded notifications
    pub fn calls(&self) -> Vec<NotifyCall> {
        self.inner.lock().calls.clone()
    }

    /// Get recorded messages only
    pub fn messages(&self) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .map(|c| c.message.clone())
            .collect()
    }
}

#[async_trait]
impl NotifyAdapter for FakeNotifyAdapter {
    fn connect(&self) -> bool {
        self.inner.lock().connected
    }

    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        self.inner.lock().calls.push(NotifyCall {
            title: title.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
