// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document rendering adapters

mod command;

pub use command::CommandRenderAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRenderAdapter, RenderCall};

use async_trait::async_trait;
use dw_core::{Artifact, SqlCredentials};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from render operations
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render failed: {0}")]
    Failed(String),
    #[error("renderer produced no output at {}", .0.display())]
    MissingOutput(PathBuf),
}

/// Adapter for rendering a document entry into artifacts.
///
/// `output` is the artifact path without extension; implementations add the
/// extension for the artifact kind they produce.
#[async_trait]
pub trait RenderAdapter: Clone + Send + Sync + 'static {
    /// Render the page-oriented primary document from `template`
    async fn render_document(
        &self,
        template: &Path,
        entry_id: i64,
        output: &Path,
    ) -> Result<Artifact, RenderError>;

    /// Render the structured export; the renderer performs its own lookups
    async fn render_export(
        &self,
        entry_id: i64,
        output: &Path,
        credentials: &SqlCredentials,
    ) -> Result<Artifact, RenderError>;
}
