// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::archive::{ArchiveAdapter, ArchiveError};
use crate::query::{QueryAdapter, QueryError};
use crate::render::{RenderAdapter, RenderError};
use async_trait::async_trait;
use dw_core::{Archive, Artifact, LookupQuery, Row, SqlCredentials};
use std::path::Path;
use tracing::Instrument;

/// Wrapper that adds tracing to any QueryAdapter
#[derive(Clone)]
pub struct TracedQuery<Q> {
    inner: Q,
}

impl<Q> TracedQuery<Q> {
    pub fn new(inner: Q) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<Q: QueryAdapter> QueryAdapter for TracedQuery<Q> {
    async fn execute(
        &self,
        credentials: &SqlCredentials,
        query: &LookupQuery,
    ) -> Result<Vec<Row>, QueryError> {
        let span = tracing::info_span!("query.execute", database = %credentials.database);
        async {
            tracing::debug!(sql = %query.sql, "executing");
            let start = std::time::Instant::now();
            let result = self.inner.execute(credentials, query).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(rows) => tracing::info!(rows = rows.len(), elapsed_ms, "query complete"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "query failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any RenderAdapter
#[derive(Clone)]
pub struct TracedRender<R> {
    inner: R,
}

impl<R> TracedRender<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: RenderAdapter> RenderAdapter for TracedRender<R> {
    async fn render_document(
        &self,
        template: &Path,
        entry_id: i64,
        output: &Path,
    ) -> Result<Artifact, RenderError> {
        let span = tracing::info_span!("render.document", entry_id, template = %template.display());
        async {
            let start = std::time::Instant::now();
            let result = self.inner.render_document(template, entry_id, output).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(a) => tracing::info!(path = %a.path.display(), elapsed_ms, "document rendered"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "document render failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn render_export(
        &self,
        entry_id: i64,
        output: &Path,
        credentials: &SqlCredentials,
    ) -> Result<Artifact, RenderError> {
        let span = tracing::info_span!("render.export", entry_id);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.render_export(entry_id, output, credentials).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(a) => tracing::info!(path = %a.path.display(), elapsed_ms, "export rendered"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "export render failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any ArchiveAdapter
#[derive(Clone)]
pub struct TracedArchive<A> {
    inner: A,
}

impl<A> TracedArchive<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: ArchiveAdapter> ArchiveAdapter for TracedArchive<A> {
    async fn package(
        &self,
        document: &Artifact,
        export: &Artifact,
        base_name: &str,
        dir: &Path,
    ) -> Result<Archive, ArchiveError> {
        let result = self.inner.package(document, export, base_name, dir).await;
        tracing::info_span!("archive.package", base_name).in_scope(|| match &result {
            Ok(archive) => tracing::info!(bytes = archive.content().len(), "packaged"),
            Err(e) => tracing::error!(error = %e, "packaging failed"),
        });
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
