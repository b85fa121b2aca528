// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake query adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{QueryAdapter, QueryError};
use async_trait::async_trait;
use dw_core::{LookupQuery, Row, SqlCredentials};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct FakeQueryState {
    rows: Vec<Row>,
    error: Option<String>,
    calls: Vec<LookupQuery>,
}

/// Fake query adapter returning canned rows
#[derive(Clone, Default)]
pub struct FakeQueryAdapter {
    inner: Arc<Mutex<FakeQueryState>>,
}

impl FakeQueryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows returned by every subsequent execute
    pub fn set_rows(&self, rows: Vec<Row>) {
        let mut inner = self.inner.lock();
        inner.rows = rows;
        inner.error = None;
    }

    /// Make every subsequent execute fail
    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.lock().error = Some(message.into());
    }

    /// Queries executed so far
    pub fn calls(&self) -> Vec<LookupQuery> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl QueryAdapter for FakeQueryAdapter {
    async fn execute(
        &self,
        _credentials: &SqlCredentials,
        query: &LookupQuery,
    ) -> Result<Vec<Row>, QueryError> {
        let mut inner = self.inner.lock();
        inner.calls.push(query.clone());
        match &inner.error {
            Some(message) => Err(QueryError::Failed(message.clone())),
            None => Ok(inner.rows.clone()),
        }
    }
}
