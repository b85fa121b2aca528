// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake render adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{RenderAdapter, RenderError};
use async_trait::async_trait;
use dw_core::{Artifact, ArtifactKind, SqlCredentials};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Recorded render call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    Document {
        template: PathBuf,
        entry_id: i64,
        output: PathBuf,
    },
    Export {
        entry_id: i64,
        output: PathBuf,
    },
}

#[derive(Default)]
struct FakeRenderState {
    calls: Vec<RenderCall>,
    document_error: Option<String>,
    export_error: Option<String>,
}

/// Fake render adapter; produces artifact paths without touching disk.
#[derive(Clone, Default)]
pub struct FakeRenderAdapter {
    inner: Arc<Mutex<FakeRenderState>>,
    gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
}

impl FakeRenderAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make document renders fail with `message`
    pub fn fail_documents(&self, message: impl Into<String>) {
        self.inner.lock().document_error = Some(message.into());
    }

    /// Make export renders fail with `message`
    pub fn fail_exports(&self, message: impl Into<String>) {
        self.inner.lock().export_error = Some(message.into());
    }

    /// Block document renders until [`release`](Self::release) is called.
    pub fn hold(&self) {
        *self.gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `n` held document renders proceed.
    pub fn release(&self, n: usize) {
        if let Some(gate) = self.gate.lock().as_ref() {
            gate.add_permits(n);
        }
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.inner.lock().calls.clone()
    }

    /// Number of document renders started (including held ones)
    pub fn document_count(&self) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, RenderCall::Document { .. }))
            .count()
    }
}

#[async_trait]
impl RenderAdapter for FakeRenderAdapter {
    async fn render_document(
        &self,
        template: &Path,
        entry_id: i64,
        output: &Path,
    ) -> Result<Artifact, RenderError> {
        let error = {
            let mut inner = self.inner.lock();
            inner.calls.push(RenderCall::Document {
                template: template.to_path_buf(),
                entry_id,
                output: output.to_path_buf(),
            });
            inner.document_error.clone()
        };

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        match error {
            Some(message) => Err(RenderError::Failed(message)),
            None => Ok(Artifact::at(ArtifactKind::Document, output)),
        }
    }

    async fn render_export(
        &self,
        entry_id: i64,
        output: &Path,
        _credentials: &SqlCredentials,
    ) -> Result<Artifact, RenderError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RenderCall::Export {
            entry_id,
            output: output.to_path_buf(),
        });
        match &inner.export_error {
            Some(message) => Err(RenderError::Failed(message.clone())),
            None => Ok(Artifact::at(ArtifactKind::Export, output)),
        }
    }
}
