// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker lifecycle, admission and serial processing tests

use super::*;
use crate::RejectReason;

#[test]
fn new_worker_is_stopped_and_rejects_work() {
    let ctx = setup();
    let conn = FakeConnection::with_body(invoice_body());

    let rejected = ctx.worker.admit(conn.boxed()).unwrap_err();

    assert_eq!(ctx.worker.state(), WorkerState::Stopped);
    assert_eq!(rejected.reason, RejectReason::NotRunning);
    assert_eq!(ctx.worker.queue_len(), 0);
    assert_eq!(conn.closes(), 0);
    assert!(ctx.worker.events().is_empty());
}

#[tokio::test]
async fn second_start_while_loop_active_fails() {
    let ctx = setup();
    let _loop = spawn_loop(&ctx).await;

    let result = Arc::clone(&ctx.worker).start().await;

    assert!(matches!(result, Err(WorkerError::LoopActive(kind)) if kind == "Invoice"));
    assert!(ctx.worker.state().is_running());
}

#[tokio::test]
async fn stop_releases_idle_loop() {
    let ctx = setup();
    let handle = spawn_loop(&ctx).await;

    ctx.worker.stop();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
    assert!(!ctx.worker.is_loop_active());
    assert_eq!(ctx.worker.events().messages(), vec!["stopped"]);
}

#[test]
fn stop_on_stopped_worker_is_a_no_op() {
    let ctx = setup();

    ctx.worker.stop();
    ctx.worker.stop();

    assert_eq!(ctx.worker.state(), WorkerState::Stopped);
    assert!(ctx.worker.events().is_empty());
}

#[tokio::test]
async fn repeated_stop_appends_one_entry() {
    let ctx = setup();
    let handle = spawn_loop(&ctx).await;

    ctx.worker.stop();
    ctx.worker.stop();
    handle.await.unwrap().unwrap();
    ctx.worker.stop();

    assert_eq!(ctx.worker.events().messages(), vec!["stopped"]);
}

#[tokio::test]
async fn restart_while_finishing_resumes_the_same_loop() {
    let ctx = setup();
    ctx.query.set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    ctx.render.hold();
    let handle = spawn_loop(&ctx).await;

    let in_flight = FakeConnection::with_body(invoice_body());
    ctx.worker.admit(in_flight.boxed()).unwrap();
    let render = ctx.render.clone();
    wait_until("in-flight render", move || render.document_count() == 1).await;

    ctx.worker.stop();
    // The old loop still owns the queue, so this start takes it over.
    Arc::clone(&ctx.worker).start().await.unwrap();
    assert!(ctx.worker.state().is_running());
    assert!(ctx.worker.is_loop_active());

    let next = FakeConnection::with_body(invoice_body_with_folio(43));
    ctx.worker.admit(next.boxed()).unwrap();
    ctx.render.release(2);
    let conn = next.clone();
    wait_until("next request served", move || conn.closes() == 1).await;

    assert_eq!(in_flight.closes(), 1);
    assert!(!next.written().is_empty());
    assert!(!handle.is_finished());

    ctx.worker.stop();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(!ctx.worker.is_loop_active());
}

#[tokio::test]
async fn worker_can_restart_after_stop() {
    let ctx = setup();
    ctx.query.set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    let handle = spawn_loop(&ctx).await;
    ctx.worker.stop();
    handle.await.unwrap().unwrap();

    let conn = FakeConnection::with_body(invoice_body());
    serve_one(&ctx, &conn).await;

    assert_eq!(
        ctx.worker.events().messages(),
        vec!["stopped", "sent A_42_uuid-42.zip"]
    );
}

#[tokio::test]
async fn requests_are_served_serially_in_admission_order() {
    let ctx = setup();
    ctx.query.set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    ctx.render.hold();
    let _loop = spawn_loop(&ctx).await;

    let first = FakeConnection::with_body(invoice_body_with_folio(42));
    let second = FakeConnection::with_body(invoice_body_with_folio(43));
    ctx.worker.admit(first.boxed()).unwrap();
    ctx.worker.admit(second.boxed()).unwrap();

    let render = ctx.render.clone();
    wait_until("first render", move || render.document_count() == 1).await;
    assert_eq!(first.reads(), 1);
    assert!(second.untouched());
    assert_eq!(ctx.worker.queue_len(), 1);

    ctx.render.release(1);
    let c = first.clone();
    wait_until("first answered", move || c.closes() == 1).await;
    let render = ctx.render.clone();
    wait_until("second render", move || render.document_count() == 2).await;

    ctx.render.release(1);
    let notifier = ctx.notifier.clone();
    wait_until("both reported", move || notifier.calls().len() == 2).await;

    assert_eq!(ctx.archive.packaged(), vec!["A_42_uuid-42", "A_43_uuid-42"]);
    assert_eq!(
        ctx.worker.events().messages(),
        vec!["sent A_42_uuid-42.zip", "sent A_43_uuid-42.zip"]
    );
    assert_eq!(second.closes(), 1);
}

#[tokio::test]
async fn stop_mid_pipeline_finishes_in_flight_request() {
    let ctx = setup();
    ctx.query.set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    ctx.render.hold();
    let handle = spawn_loop(&ctx).await;

    let in_flight = FakeConnection::with_body(invoice_body());
    let queued = FakeConnection::with_body(invoice_body_with_folio(43));
    ctx.worker.admit(in_flight.boxed()).unwrap();
    ctx.worker.admit(queued.boxed()).unwrap();
    let render = ctx.render.clone();
    wait_until("in-flight render", move || render.document_count() == 1).await;

    ctx.worker.stop();

    assert_eq!(ctx.worker.state(), WorkerState::Stopped);
    assert_eq!(ctx.worker.queue_len(), 0);
    assert_eq!(queued.closes(), 1);
    assert_eq!(queued.reads(), 0);
    assert_eq!(in_flight.closes(), 0);
    let late = FakeConnection::default();
    assert!(ctx.worker.admit(late.boxed()).is_err());

    ctx.render.release(1);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(in_flight.closes(), 1);
    assert!(!in_flight.written().is_empty());
    assert_eq!(ctx.render.document_count(), 1);
    assert_eq!(
        ctx.worker.events().messages(),
        vec![
            "dropped 1 queued request(s) on stop",
            "stopped",
            "sent A_42_uuid-42.zip"
        ]
    );
}

#[tokio::test]
async fn bounded_queue_rejects_when_full() {
    let ctx = setup_with(|config| config.max_queue = Some(1));
    ctx.query.set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    ctx.render.hold();
    let _loop = spawn_loop(&ctx).await;

    ctx.worker
        .admit(FakeConnection::with_body(invoice_body()).boxed())
        .unwrap();
    let render = ctx.render.clone();
    wait_until("in-flight render", move || render.document_count() == 1).await;
    ctx.worker
        .admit(FakeConnection::with_body(invoice_body()).boxed())
        .unwrap();

    let rejected = ctx
        .worker
        .admit(FakeConnection::default().boxed())
        .unwrap_err();

    assert_eq!(rejected.reason, RejectReason::QueueFull);
    assert_eq!(ctx.worker.queue_len(), 1);
    ctx.render.release(2);
}

#[tokio::test]
async fn evicted_request_is_returned_unclosed() {
    let ctx = setup();
    ctx.query.set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    ctx.render.hold();
    let _loop = spawn_loop(&ctx).await;

    ctx.worker
        .admit(FakeConnection::with_body(invoice_body()).boxed())
        .unwrap();
    let render = ctx.render.clone();
    wait_until("in-flight render", move || render.document_count() == 1).await;
    let waiting = FakeConnection::with_body(invoice_body());
    let id = ctx.worker.admit(waiting.boxed()).unwrap();

    let evicted = ctx.worker.evict(&id).unwrap();

    assert_eq!(evicted.id, id);
    assert_eq!(ctx.worker.queue_len(), 0);
    assert!(waiting.untouched());
    assert!(ctx.worker.evict(&id).is_none());
    ctx.render.release(1);
}

#[tokio::test]
async fn attributes_expose_config_and_live_state() {
    let ctx = setup();
    let _loop = spawn_loop(&ctx).await;
    let attributes = ctx.worker.attributes();

    assert!(AttributeKey::ALL.iter().all(|k| attributes.contains_key(k)));
    assert_eq!(
        attributes[&AttributeKey::DocumentKind].as_text(),
        Some("Invoice")
    );
    assert_eq!(attributes[&AttributeKey::TableName].as_text(), Some("OINV"));
    assert_eq!(attributes[&AttributeKey::QueueLength].as_count(), Some(0));

    // The events attribute is a live view, not a snapshot
    let events = attributes[&AttributeKey::Events].as_events().unwrap().clone();
    ctx.worker.stop();
    assert_eq!(events.messages(), vec!["stopped"]);
}

#[test]
fn notifier_connectivity_is_reported() {
    let ctx = setup();
    assert!(ctx.worker.connect_notifier());
    ctx.notifier.set_disconnected();
    assert!(!ctx.worker.connect_notifier());
}
