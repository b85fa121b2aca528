// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{fake_registry, wait_until, FakeRegistry, Fakes};
use axum::body::Body;
use axum::http::Request;
use dw_core::test_support::{invoice_body, lookup_row};
use tower::ServiceExt;

struct TestServer {
    app: Router,
    registry: Arc<FakeRegistry>,
    fakes: Fakes,
    _dir: tempfile::TempDir,
}

fn test_server() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let (registry, fakes) = fake_registry(dir.path());
    let app = router(AppState {
        registry: Arc::clone(&registry),
        started: Instant::now(),
    });
    TestServer {
        app,
        registry,
        fakes,
        _dir: dir,
    }
}

async fn start(server: &TestServer, kind: &str) {
    server.registry.start(kind).unwrap();
    let registry = Arc::clone(&server.registry);
    let kind = kind.to_string();
    wait_until("worker running", move || {
        registry
            .get(&kind)
            .is_some_and(|w| w.state().is_running())
    })
    .await;
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::post(uri).body(body.into()).unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn document_request_returns_archive() {
    let server = test_server();
    server
        .fakes
        .query
        .set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    start(&server, "Invoice").await;

    let response = server
        .app
        .clone()
        .oneshot(post("/documents/Invoice", invoice_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["cookie"],
        "fileName=\"A_42_uuid-42.zip\";"
    );
    assert_eq!(response.headers()[CONTENT_TYPE], "application/zip");
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("A_42_uuid-42.pdf"));
}

#[tokio::test]
async fn failed_request_returns_empty_500() {
    let server = test_server();
    start(&server, "Invoice").await;

    let response = server
        .app
        .clone()
        .oneshot(post("/documents/Invoice", invoice_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_bytes(response).await.is_empty());
    let registry = Arc::clone(&server.registry);
    wait_until("failure recorded", move || {
        !registry.get("Invoice").unwrap().events().is_empty()
    })
    .await;
    let events = server.registry.get("Invoice").unwrap().events().messages();
    assert_eq!(events, vec!["no document found for series A folio 42"]);
}

#[tokio::test]
async fn stopped_worker_returns_503() {
    let server = test_server();

    let response = server
        .app
        .clone()
        .oneshot(post("/documents/Invoice", invoice_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(server.fakes.query.calls().is_empty());
}

#[tokio::test]
async fn unknown_kind_returns_404() {
    let server = test_server();

    let response = server
        .app
        .clone()
        .oneshot(post("/documents/Receipt", invoice_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "no worker serves document kind \"Receipt\"");
}

#[tokio::test]
async fn dropped_request_is_evicted_from_queue() {
    let server = test_server();
    server
        .fakes
        .query
        .set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    server.fakes.render.hold();
    start(&server, "Invoice").await;

    // First request occupies the loop
    let first = tokio::spawn(
        server
            .app
            .clone()
            .oneshot(post("/documents/Invoice", invoice_body())),
    );
    let render = server.fakes.render.clone();
    wait_until("first render", move || render.document_count() == 1).await;

    // Second request waits in the queue until its client goes away
    let second = tokio::spawn(
        server
            .app
            .clone()
            .oneshot(post("/documents/Invoice", invoice_body())),
    );
    let registry = Arc::clone(&server.registry);
    wait_until("second queued", move || {
        registry.get("Invoice").unwrap().queue_len() == 1
    })
    .await;
    second.abort();
    let registry = Arc::clone(&server.registry);
    wait_until("second evicted", move || {
        registry.get("Invoice").unwrap().queue_len() == 0
    })
    .await;

    server.fakes.render.release(1);
    let response = first.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.fakes.render.document_count(), 1);
}

#[tokio::test]
async fn status_lists_workers_with_attributes() {
    let server = test_server();
    start(&server, "Invoice").await;

    let response = server
        .app
        .clone()
        .oneshot(Request::get("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let workers = body["workers"].as_array().unwrap();
    assert_eq!(workers.len(), 2);
    assert_eq!(workers[0]["document-kind"], "CreditNote");
    assert_eq!(workers[0]["state"], "stopped");
    assert_eq!(workers[1]["document-kind"], "Invoice");
    assert_eq!(workers[1]["state"], "running");
    assert_eq!(workers[1]["loop_active"], true);
    assert_eq!(workers[1]["table-name"], "OINV");
    assert_eq!(workers[1]["queue-length"], 0);
    assert!(workers[1]["events"].as_array().unwrap().is_empty());
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn admin_start_and_stop() {
    let server = test_server();

    let response = server
        .app
        .clone()
        .oneshot(post("/workers/CreditNote/start", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let registry = Arc::clone(&server.registry);
    wait_until("credit note running", move || {
        registry.get("CreditNote").unwrap().state().is_running()
    })
    .await;

    let response = server
        .app
        .clone()
        .oneshot(post("/workers/CreditNote/start", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = server
        .app
        .clone()
        .oneshot(post("/workers/CreditNote/stop", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["state"], "stopped");
    assert_eq!(body["events"][0]["message"], "stopped");
}

#[yare::parameterized(
    detail = { "GET", "/workers/Receipt" },
    start  = { "POST", "/workers/Receipt/start" },
    stop   = { "POST", "/workers/Receipt/stop" },
)]
fn admin_unknown_kind_is_404(method: &str, uri: &str) {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async {
            let server = test_server();
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = server.app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        });
}

#[tokio::test]
async fn http_connection_close_without_body_is_500() {
    let (connection, reply) = HttpConnection::new(b"{}".to_vec());
    Box::new(connection).close().unwrap();
    let response = reply.await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn http_connection_reports_closed_peer() {
    let (mut connection, reply) = HttpConnection::new(Vec::new());
    drop(reply);
    assert!(matches!(
        connection.write(b"zip").await,
        Err(TransportError::Closed)
    ));
    assert!(Box::new(connection).close().is_err());
}

#[tokio::test]
async fn http_connection_body_is_read_once() {
    let (mut connection, _reply) = HttpConnection::new(b"payload".to_vec());
    assert_eq!(connection.read_body().await.unwrap(), b"payload");
    assert!(connection.read_body().await.unwrap().is_empty());
}
