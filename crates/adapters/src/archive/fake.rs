// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake archive adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ArchiveAdapter, ArchiveError};
use async_trait::async_trait;
use dw_core::{Archive, Artifact};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

#[derive(Default)]
struct FakeArchiveState {
    packaged: Vec<String>,
    error: Option<String>,
}

/// Fake archive adapter.
///
/// Archive content is `"<document path>|<export path>"` so tests can assert
/// what was streamed.
#[derive(Clone, Default)]
pub struct FakeArchiveAdapter {
    inner: Arc<Mutex<FakeArchiveState>>,
}

impl FakeArchiveAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.lock().error = Some(message.into());
    }

    /// Base names packaged so far
    pub fn packaged(&self) -> Vec<String> {
        self.inner.lock().packaged.clone()
    }
}

#[async_trait]
impl ArchiveAdapter for FakeArchiveAdapter {
    async fn package(
        &self,
        document: &Artifact,
        export: &Artifact,
        base_name: &str,
        _dir: &Path,
    ) -> Result<Archive, ArchiveError> {
        let mut inner = self.inner.lock();
        if let Some(message) = &inner.error {
            return Err(ArchiveError::Failed(message.clone()));
        }
        inner.packaged.push(base_name.to_string());
        let content = format!("{}|{}", document.path.display(), export.path.display());
        Ok(Archive::new(format!("{base_name}.zip"), content.into_bytes()))
    }
}
