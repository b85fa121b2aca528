// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command notification adapter.
//!
//! Pushes each notification to an external program as a JSON payload:
//! `<program> [args...] '{"title":"...","message":"..."}'`. The program is
//! spawned in the background; its failures are logged, never returned.

use super::{NotifyAdapter, NotifyError};
use crate::subprocess::{run_with_timeout, stderr_summary, NOTIFY_TIMEOUT};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;

#[derive(Clone, Debug)]
pub struct CommandNotifyAdapter {
    program: Arc<str>,
    args: Arc<[String]>,
}

impl CommandNotifyAdapter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: Arc::from(program.into()),
            args: Arc::from(args),
        }
    }

    fn program_resolvable(&self) -> bool {
        let program = Path::new(&*self.program);
        if self.program.is_empty() {
            return false;
        }
        if program.components().count() > 1 {
            return program.is_file();
        }
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl NotifyAdapter for CommandNotifyAdapter {
    fn connect(&self) -> bool {
        self.program_resolvable()
    }

    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        if self.program.is_empty() {
            return Err(NotifyError::SendFailed("no notify program configured".into()));
        }

        let payload = serde_json::json!({ "title": title, "message": message }).to_string();
        let mut cmd = Command::new(&*self.program);
        cmd.args(self.args.iter()).arg(&payload);
        let program = Arc::clone(&self.program);

        tokio::spawn(async move {
            match run_with_timeout(cmd, NOTIFY_TIMEOUT, "notify command").await {
                Ok(output) if output.status.success() => {
                    tracing::debug!(program = %program, "notification delivered");
                }
                Ok(output) => {
                    let stderr = stderr_summary(&output);
                    tracing::warn!(program = %program, %stderr, "notify command exited with non-zero status");
                }
                Err(e) => {
                    tracing::warn!(program = %program, error = %e, "notify command failed");
                }
            }
        });

        Ok(())
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
