// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-request generation pipeline

use super::Worker;
use crate::connection::Connection;
use crate::error::RequestError;
use dw_adapters::{ArchiveAdapter, NotifyAdapter, QueryAdapter, RenderAdapter};
use dw_core::{
    artifact_base_name, resolve_record, DocumentRequest, LookupQuery, MultipleRows, RecordError,
    ResolvedRecord,
};
use std::path::Path;

/// Header carrying the archive's file name to the client
pub const FILE_NAME_HEADER: &str = "Cookie";

impl<Q, R, A, N> Worker<Q, R, A, N>
where
    Q: QueryAdapter,
    R: RenderAdapter,
    A: ArchiveAdapter,
    N: NotifyAdapter,
{
    /// Decode, look up, render, package and write one response.
    ///
    /// Artifacts go under `scratch`. Returns the archive file name. The
    /// caller closes the connection.
    pub(crate) async fn generate(
        &self,
        scratch: &Path,
        connection: &mut dyn Connection,
    ) -> Result<String, RequestError> {
        let body = connection.read_body().await?;
        let request = DocumentRequest::decode(&body)?;
        tracing::debug!(series = %request.series, folio = request.folio, "decoded request");

        let record = self.lookup(&request).await?;
        let base_name = artifact_base_name(&request, &record);

        tokio::fs::create_dir_all(scratch).await?;
        let output = scratch.join(&base_name);
        let render = &self.deps.render;
        let document = render
            .render_document(&self.config.template_path, record.entry_id, &output)
            .await?;
        let export = render
            .render_export(record.entry_id, &output, &self.config.credentials)
            .await?;

        let archive = self
            .deps
            .archive
            .package(&document, &export, &base_name, scratch)
            .await?;

        connection.set_header(
            FILE_NAME_HEADER,
            &format!("fileName=\"{}\";", archive.file_name()),
        );
        connection.write(archive.content()).await?;
        connection.flush().await?;

        Ok(archive.file_name().to_string())
    }

    async fn lookup(&self, request: &DocumentRequest) -> Result<ResolvedRecord, RequestError> {
        let query = LookupQuery::for_document(&self.config.table, request);
        let rows = self
            .deps
            .query
            .execute(&self.config.credentials, &query)
            .await?;

        if rows.len() > 1 && self.config.multiple_rows == MultipleRows::First {
            tracing::warn!(
                rows = rows.len(),
                series = %request.series,
                folio = request.folio,
                "multiple documents match, using the first"
            );
        }

        resolve_record(&rows, self.config.multiple_rows).map_err(|e| match e {
            RecordError::NotFound => RequestError::NotFound {
                series: request.series.clone(),
                folio: request.folio,
            },
            RecordError::Ambiguous(count) => RequestError::Ambiguous {
                series: request.series.clone(),
                folio: request.folio,
                count,
            },
            column => RequestError::Record(column),
        })
    }
}
