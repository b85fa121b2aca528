// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Default timeout for relational lookups.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for a single render (document or export).
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(120);

/// Default timeout for packaging artifacts into an archive.
pub const ARCHIVE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for notification commands.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error message. The child is
/// killed when the timeout elapses or the caller drops the future.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

/// Run a subprocess, writing `input` to its stdin, with a timeout.
pub async fn run_with_input(
    mut cmd: Command,
    input: &[u8],
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let run = async {
        let mut child = cmd.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input).await?;
            // Close stdin so the child sees EOF
            drop(stdin);
        }
        child.wait_with_output().await
    };

    match tokio::time::timeout(timeout, run).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

/// Summarize a failed command's stderr for error messages.
pub fn stderr_summary(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        format!("exited with {}", output.status)
    } else {
        trimmed.lines().last().unwrap_or(trimmed).to_string()
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
