// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document Worker Daemon library
//!
//! Configuration, lifecycle and the HTTP surface of `dwd`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod lifecycle;
pub mod listener;
pub mod notifier;
pub mod protocol;
pub mod workers;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, DaemonConfig};
pub use lifecycle::{Daemon, LifecycleError, Paths, StartupResult};
pub use listener::{router, AppState, HttpConnection};
pub use protocol::{DaemonStatus, WorkerStatus};
pub use workers::{RegistryError, WorkerRegistry};
