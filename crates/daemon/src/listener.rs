// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP listener.
//!
//! `POST /documents/{kind}` hands the request to the worker for `kind` as an
//! [`HttpConnection`] and waits for the worker to close it. Everything else is
//! the administrative surface.

use crate::protocol::{DaemonStatus, ErrorBody, WorkerStatus};
use crate::workers::{RegistryError, WorkerRegistry};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dw_adapters::{ArchiveAdapter, NotifyAdapter, QueryAdapter, RenderAdapter};
use dw_core::RequestId;
use dw_engine::{Connection, TransportError, Worker, WorkerError};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Shared state of every route
pub struct AppState<Q, R, A, N> {
    pub registry: Arc<WorkerRegistry<Q, R, A, N>>,
    pub started: Instant,
}

impl<Q, R, A, N> Clone for AppState<Q, R, A, N> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            started: self.started,
        }
    }
}

pub fn router<Q, R, A, N>(state: AppState<Q, R, A, N>) -> Router
where
    Q: QueryAdapter,
    R: RenderAdapter,
    A: ArchiveAdapter,
    N: NotifyAdapter,
{
    Router::new()
        .route("/documents/{kind}", post(submit::<Q, R, A, N>))
        .route("/status", get(status::<Q, R, A, N>))
        .route("/workers/{kind}", get(worker_status::<Q, R, A, N>))
        .route("/workers/{kind}/start", post(start_worker::<Q, R, A, N>))
        .route("/workers/{kind}/stop", post(stop_worker::<Q, R, A, N>))
        .with_state(state)
}

/// Serve `app` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// An HTTP request body plus a buffered response.
///
/// Closing sends the response back to the waiting handler: `200` with the
/// collected headers and bytes, or an empty `500` if nothing was written.
pub struct HttpConnection {
    body: Vec<u8>,
    headers: HeaderMap,
    written: Vec<u8>,
    reply: oneshot::Sender<Response>,
}

impl HttpConnection {
    pub fn new(body: Vec<u8>) -> (Self, oneshot::Receiver<Response>) {
        let (reply, receiver) = oneshot::channel();
        let connection = Self {
            body,
            headers: HeaderMap::new(),
            written: Vec::new(),
            reply,
        };
        (connection, receiver)
    }
}

#[async_trait]
impl Connection for HttpConnection {
    async fn read_body(&mut self) -> Result<Vec<u8>, TransportError> {
        Ok(std::mem::take(&mut self.body))
    }

    fn set_header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(name, value, "dropping invalid response header"),
        }
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.reply.is_closed() {
            return Err(TransportError::Closed);
        }
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), TransportError> {
        let Self {
            headers,
            written,
            reply,
            ..
        } = *self;
        let response = if written.is_empty() {
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        } else {
            let mut response =
                (StatusCode::OK, [(CONTENT_TYPE, "application/zip")], written).into_response();
            response.headers_mut().extend(headers);
            response
        };
        reply.send(response).map_err(|_| TransportError::Closed)
    }
}

/// Evicts a still-queued request if the handler future is dropped,
/// which is what happens when the client disconnects.
struct EvictOnDrop<Q, R, A, N>
where
    Q: QueryAdapter,
    R: RenderAdapter,
    A: ArchiveAdapter,
    N: NotifyAdapter,
{
    worker: Arc<Worker<Q, R, A, N>>,
    id: Option<RequestId>,
}

impl<Q, R, A, N> Drop for EvictOnDrop<Q, R, A, N>
where
    Q: QueryAdapter,
    R: RenderAdapter,
    A: ArchiveAdapter,
    N: NotifyAdapter,
{
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(pending) = self.worker.evict(&id) {
            tracing::debug!(%id, kind = %self.worker.kind(), "client went away while queued");
            pending.close_quietly();
        }
    }
}

async fn submit<Q, R, A, N>(
    State(state): State<AppState<Q, R, A, N>>,
    Path(kind): Path<String>,
    body: Bytes,
) -> Response
where
    Q: QueryAdapter,
    R: RenderAdapter,
    A: ArchiveAdapter,
    N: NotifyAdapter,
{
    let Some(worker) = state.registry.get(&kind).map(Arc::clone) else {
        return error_response(StatusCode::NOT_FOUND, RegistryError::UnknownKind(kind));
    };

    let (connection, reply) = HttpConnection::new(body.to_vec());
    let id = match worker.admit(Box::new(connection)) {
        Ok(id) => id,
        Err(rejected) => {
            let reason = rejected.reason;
            if let Err(e) = rejected.connection.close() {
                tracing::debug!(error = %e, "closing rejected request");
            }
            return (StatusCode::SERVICE_UNAVAILABLE, reason.to_string()).into_response();
        }
    };

    let mut guard = EvictOnDrop {
        worker,
        id: Some(id),
    };
    let response = reply.await;
    guard.id = None;
    response.unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

async fn status<Q, R, A, N>(State(state): State<AppState<Q, R, A, N>>) -> Json<DaemonStatus>
where
    Q: QueryAdapter,
    R: RenderAdapter,
    A: ArchiveAdapter,
    N: NotifyAdapter,
{
    Json(DaemonStatus {
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started.elapsed().as_secs(),
        workers: state
            .registry
            .iter()
            .map(|w| WorkerStatus::of(w.as_ref()))
            .collect(),
    })
}

async fn worker_status<Q, R, A, N>(
    State(state): State<AppState<Q, R, A, N>>,
    Path(kind): Path<String>,
) -> Response
where
    Q: QueryAdapter,
    R: RenderAdapter,
    A: ArchiveAdapter,
    N: NotifyAdapter,
{
    match state.registry.get(&kind) {
        Some(worker) => Json(WorkerStatus::of(worker.as_ref())).into_response(),
        None => error_response(StatusCode::NOT_FOUND, RegistryError::UnknownKind(kind)),
    }
}

async fn start_worker<Q, R, A, N>(
    State(state): State<AppState<Q, R, A, N>>,
    Path(kind): Path<String>,
) -> Response
where
    Q: QueryAdapter,
    R: RenderAdapter,
    A: ArchiveAdapter,
    N: NotifyAdapter,
{
    match state.registry.start(&kind) {
        Ok(()) => {
            tracing::info!(%kind, "worker start requested");
            StatusCode::ACCEPTED.into_response()
        }
        Err(e) => registry_error(e),
    }
}

async fn stop_worker<Q, R, A, N>(
    State(state): State<AppState<Q, R, A, N>>,
    Path(kind): Path<String>,
) -> Response
where
    Q: QueryAdapter,
    R: RenderAdapter,
    A: ArchiveAdapter,
    N: NotifyAdapter,
{
    match state.registry.stop(&kind) {
        Ok(()) => match state.registry.get(&kind) {
            Some(worker) => Json(WorkerStatus::of(worker.as_ref())).into_response(),
            None => StatusCode::OK.into_response(),
        },
        Err(e) => registry_error(e),
    }
}

fn registry_error(error: RegistryError) -> Response {
    let status = match &error {
        RegistryError::UnknownKind(_) => StatusCode::NOT_FOUND,
        RegistryError::Worker(WorkerError::LoopActive(_)) => StatusCode::CONFLICT,
    };
    error_response(status, error)
}

fn error_response(status: StatusCode, error: impl std::fmt::Display) -> Response {
    let body = ErrorBody {
        error: error.to_string(),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
