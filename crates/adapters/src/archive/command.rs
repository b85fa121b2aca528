// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Archive adapter backed by the `zip` command line tool.

use super::{ArchiveAdapter, ArchiveError};
use crate::subprocess::{run_with_timeout, stderr_summary, ARCHIVE_TIMEOUT};
use async_trait::async_trait;
use dw_core::{Archive, Artifact};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

#[derive(Clone, Debug)]
pub struct CommandArchiveAdapter {
    program: Arc<str>,
    args: Arc<[String]>,
    timeout: Duration,
}

impl Default for CommandArchiveAdapter {
    /// `zip -j -q`: store files without their directories, quietly.
    fn default() -> Self {
        Self::new("zip", vec!["-j".to_string(), "-q".to_string()])
    }
}

impl CommandArchiveAdapter {
    /// Invoked as `<program> [args...] <archive> <document> <export>`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: Arc::from(program.into()),
            args: Arc::from(args),
            timeout: ARCHIVE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ArchiveAdapter for CommandArchiveAdapter {
    async fn package(
        &self,
        document: &Artifact,
        export: &Artifact,
        base_name: &str,
        dir: &Path,
    ) -> Result<Archive, ArchiveError> {
        let file_name = format!("{base_name}.zip");
        let path = dir.join(&file_name);

        let mut cmd = Command::new(&*self.program);
        cmd.args(self.args.iter())
            .arg(&path)
            .arg(&document.path)
            .arg(&export.path);

        let output = run_with_timeout(cmd, self.timeout, "archive packager")
            .await
            .map_err(ArchiveError::Failed)?;
        if !output.status.success() {
            return Err(ArchiveError::Failed(stderr_summary(&output)));
        }

        let content = tokio::fs::read(&path).await?;
        Ok(Archive::new(file_name, content))
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
