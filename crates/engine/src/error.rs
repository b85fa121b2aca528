// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the document worker

use crate::connection::TransportError;
use dw_adapters::{ArchiveError, QueryError, RenderError};
use dw_core::{DecodeError, RecordError};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single request; never fatal to the worker.
///
/// The display text is what lands in the event log and notifier.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("no document found for series {series} folio {folio}")]
    NotFound { series: String, folio: i64 },
    #[error("{count} documents match series {series} folio {folio}")]
    Ambiguous {
        series: String,
        folio: i64,
        count: usize,
    },
    #[error("unreadable lookup row: {0}")]
    Record(RecordError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("request exceeded its {}s deadline", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("scratch directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from worker lifecycle operations
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker {0} is already running")]
    LoopActive(String),
}
