// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the document worker's external collaborators

pub mod archive;
pub mod notify;
pub mod query;
pub mod render;
pub mod subprocess;
pub mod traced;

pub use archive::{ArchiveAdapter, ArchiveError, CommandArchiveAdapter};
pub use notify::{
    CommandNotifyAdapter, DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError,
};
pub use query::{CommandQueryAdapter, QueryAdapter, QueryError};
pub use render::{CommandRenderAdapter, RenderAdapter, RenderError};
pub use traced::{TracedArchive, TracedQuery, TracedRender};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use archive::FakeArchiveAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use query::FakeQueryAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use render::{FakeRenderAdapter, RenderCall};
