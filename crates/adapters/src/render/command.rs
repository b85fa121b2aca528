// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Render adapter backed by an external rendering program.
//!
//! Invocations:
//!
//! ```text
//! <program> [args...] document --template <path> --entry <id> --output <base>.pdf
//! <program> [args...] export --entry <id> --output <base>.xml
//! ```
//!
//! Both receive the store credentials in `DW_SQL_*` environment variables.

use super::{RenderAdapter, RenderError};
use crate::subprocess::{run_with_timeout, stderr_summary, RENDER_TIMEOUT};
use async_trait::async_trait;
use dw_core::{Artifact, ArtifactKind, SqlCredentials};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

#[derive(Clone, Debug)]
pub struct CommandRenderAdapter {
    program: Arc<str>,
    args: Arc<[String]>,
    /// Credentials for the page renderer's own data source
    credentials: Arc<SqlCredentials>,
    timeout: Duration,
}

impl CommandRenderAdapter {
    pub fn new(program: impl Into<String>, args: Vec<String>, credentials: SqlCredentials) -> Self {
        Self {
            program: Arc::from(program.into()),
            args: Arc::from(args),
            credentials: Arc::new(credentials),
            timeout: RENDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(
        &self,
        mut cmd: Command,
        artifact: Artifact,
        description: &str,
    ) -> Result<Artifact, RenderError> {
        cmd.arg("--output").arg(&artifact.path);
        let output = run_with_timeout(cmd, self.timeout, description)
            .await
            .map_err(RenderError::Failed)?;

        if !output.status.success() {
            return Err(RenderError::Failed(format!(
                "{}: {}",
                description,
                stderr_summary(&output)
            )));
        }
        if !tokio::fs::try_exists(&artifact.path).await.unwrap_or(false) {
            return Err(RenderError::MissingOutput(artifact.path));
        }
        Ok(artifact)
    }

    fn command(&self, subcommand: &str, credentials: &SqlCredentials) -> Command {
        let mut cmd = Command::new(&*self.program);
        cmd.args(self.args.iter())
            .arg(subcommand)
            .envs(credentials.env());
        cmd
    }
}

#[async_trait]
impl RenderAdapter for CommandRenderAdapter {
    async fn render_document(
        &self,
        template: &Path,
        entry_id: i64,
        output: &Path,
    ) -> Result<Artifact, RenderError> {
        let mut cmd = self.command("document", &self.credentials);
        cmd.arg("--template")
            .arg(template)
            .arg("--entry")
            .arg(entry_id.to_string());
        self.run(
            cmd,
            Artifact::at(ArtifactKind::Document, output),
            "document render",
        )
        .await
    }

    async fn render_export(
        &self,
        entry_id: i64,
        output: &Path,
        credentials: &SqlCredentials,
    ) -> Result<Artifact, RenderError> {
        let mut cmd = self.command("export", credentials);
        cmd.arg("--entry").arg(entry_id.to_string());
        self.run(
            cmd,
            Artifact::at(ArtifactKind::Export, output),
            "export render",
        )
        .await
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
