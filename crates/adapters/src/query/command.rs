// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query adapter backed by an external executor program.
//!
//! The program receives `{"sql": ..., "params": {...}}` on stdin and the
//! credentials in `DW_SQL_*` environment variables. It must print the rows
//! as a JSON array of arrays on stdout.

use super::{QueryAdapter, QueryError};
use crate::subprocess::{run_with_input, stderr_summary, QUERY_TIMEOUT};
use async_trait::async_trait;
use dw_core::{LookupQuery, Row, SqlCredentials};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

#[derive(Clone, Debug)]
pub struct CommandQueryAdapter {
    program: Arc<str>,
    args: Arc<[String]>,
    timeout: Duration,
}

impl CommandQueryAdapter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: Arc::from(program.into()),
            args: Arc::from(args),
            timeout: QUERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl QueryAdapter for CommandQueryAdapter {
    async fn execute(
        &self,
        credentials: &SqlCredentials,
        query: &LookupQuery,
    ) -> Result<Vec<Row>, QueryError> {
        let mut cmd = Command::new(&*self.program);
        cmd.args(self.args.iter()).envs(credentials.env());

        let input = query.to_json().to_string();
        let output = run_with_input(cmd, input.as_bytes(), self.timeout, "query executor")
            .await
            .map_err(QueryError::Failed)?;

        if !output.status.success() {
            return Err(QueryError::Failed(stderr_summary(&output)));
        }

        parse_rows(&output.stdout)
    }
}

/// Parse executor stdout into rows.
pub(crate) fn parse_rows(stdout: &[u8]) -> Result<Vec<Row>, QueryError> {
    let value: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| QueryError::InvalidOutput(e.to_string()))?;
    let serde_json::Value::Array(rows) = value else {
        return Err(QueryError::InvalidOutput("expected an array of rows".into()));
    };
    rows.into_iter()
        .map(|row| match row {
            serde_json::Value::Array(columns) => Ok(columns),
            other => Err(QueryError::InvalidOutput(format!(
                "expected a row array, got {other}"
            ))),
        })
        .collect()
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
