// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification adapters

mod command;
mod desktop;
mod noop;

pub use command::CommandNotifyAdapter;
pub use desktop::DesktopNotifyAdapter;
pub use noop::NoOpNotifyAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyAdapter, NotifyCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from notify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Adapter for pushing status messages to an operator-facing channel.
///
/// Delivery is fire-and-forget: implementations log their own failures and
/// callers never block on the channel.
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    /// Check that the channel can deliver; returns false when it cannot.
    fn connect(&self) -> bool;

    /// Send a notification with a title and message body
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError>;
}
