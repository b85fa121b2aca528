// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Archive packaging adapters

mod command;

pub use command::CommandArchiveAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeArchiveAdapter;

use async_trait::async_trait;
use dw_core::{Archive, Artifact};
use std::path::Path;
use thiserror::Error;

/// Errors from archive operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("packaging failed: {0}")]
    Failed(String),
    #[error("reading archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Adapter for bundling rendered artifacts into one archive
#[async_trait]
pub trait ArchiveAdapter: Clone + Send + Sync + 'static {
    /// Package both artifacts as `<dir>/<base_name>.zip`
    async fn package(
        &self,
        document: &Artifact,
        export: &Artifact,
        base_name: &str,
        dir: &Path,
    ) -> Result<Archive, ArchiveError>;
}
