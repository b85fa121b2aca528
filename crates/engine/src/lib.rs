// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Document worker engine: admission queue, processing loop and pipeline

pub mod connection;
mod error;
pub mod queue;
mod worker;

#[cfg(test)]
mod test_helpers;

pub use connection::{Connection, PendingRequest, TransportError};
pub use error::{RequestError, WorkerError};
pub use queue::{AdmissionQueue, RejectReason, Rejected};
pub use worker::{Worker, WorkerConfig, WorkerDeps, FILE_NAME_HEADER};
