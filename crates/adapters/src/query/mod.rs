// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Relational query adapters

mod command;

pub use command::CommandQueryAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeQueryAdapter;

use async_trait::async_trait;
use dw_core::{LookupQuery, Row, SqlCredentials};
use thiserror::Error;

/// Errors from query operations
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query failed: {0}")]
    Failed(String),
    #[error("invalid query output: {0}")]
    InvalidOutput(String),
}

/// Adapter for executing lookups against the relational store
#[async_trait]
pub trait QueryAdapter: Clone + Send + Sync + 'static {
    /// Execute `query` and return its rows in order
    async fn execute(
        &self,
        credentials: &SqlCredentials,
        query: &LookupQuery,
    ) -> Result<Vec<Row>, QueryError>;
}
