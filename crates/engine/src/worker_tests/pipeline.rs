// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generation pipeline tests

use super::*;
use std::path::PathBuf;

#[tokio::test]
async fn end_to_end_streams_named_archive() {
    let ctx = setup();
    ctx.query.set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    let conn = FakeConnection::with_body(invoice_body());

    serve_one(&ctx, &conn).await;

    assert_eq!(
        conn.header(FILE_NAME_HEADER).as_deref(),
        Some("fileName=\"A_42_uuid-42.zip\";")
    );
    let written = String::from_utf8(conn.written()).unwrap();
    assert!(written.contains("A_42_uuid-42.pdf"));
    assert!(written.contains("A_42_uuid-42.xml"));
    assert_eq!(conn.flushes(), 1);
    assert_eq!(conn.closes(), 1);

    let events = ctx.worker.events().messages();
    assert_eq!(events, vec!["sent A_42_uuid-42.zip".to_string()]);
    assert!(events[0].contains("uuid-42"));
    assert_eq!(ctx.notifier.messages(), vec!["sent: A_42_uuid-42.zip"]);
    assert_eq!(ctx.notifier.calls()[0].title, "Invoice");
    assert_eq!(ctx.archive.packaged(), vec!["A_42_uuid-42"]);
}

#[tokio::test]
async fn lookup_binds_request_keys_to_configured_table() {
    let ctx = setup();
    ctx.query.set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    let conn = FakeConnection::with_body(invoice_body());

    serve_one(&ctx, &conn).await;

    let calls = ctx.query.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].sql.contains("FROM OINV"));
    assert!(!calls[0].sql.contains("XYZ010101AAA"));
    assert_eq!(
        calls[0].param("tax_id"),
        Some(&dw_core::QueryParam::Text("XYZ010101AAA".to_string()))
    );
    assert_eq!(calls[0].param("folio"), Some(&dw_core::QueryParam::Int(42)));
}

#[tokio::test]
async fn renders_with_entry_id_into_request_scratch_dir() {
    let ctx = setup();
    ctx.query.set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    let conn = FakeConnection::with_body(invoice_body());

    serve_one(&ctx, &conn).await;

    let calls = ctx.render.calls();
    let [RenderCall::Document {
        template,
        entry_id,
        output,
    }, RenderCall::Export {
        entry_id: export_entry,
        output: export_output,
    }] = calls.as_slice()
    else {
        panic!("unexpected render calls: {calls:?}");
    };
    assert_eq!(template, &PathBuf::from("/templates/invoice.rpt"));
    assert_eq!(*entry_id, 7);
    assert_eq!(*export_entry, 7);
    assert_eq!(output, export_output);
    assert_eq!(output.file_name().unwrap(), "A_42_uuid-42");

    // <output_dir>/<request-id>/A_42_uuid-42, removed once served
    let scratch = output.parent().unwrap();
    assert_eq!(scratch.parent().unwrap(), ctx.output_dir);
    assert!(!scratch.exists());
}

#[tokio::test]
async fn legacy_field_names_are_accepted() {
    let ctx = setup();
    ctx.query.set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    let conn = FakeConnection::with_body(
        r#"{"Tipo":"Invoice","Serie":"A","RFC":"XYZ010101AAA","Folio":42}"#,
    );

    serve_one(&ctx, &conn).await;

    assert_eq!(ctx.worker.events().messages(), vec!["sent A_42_uuid-42.zip"]);
}

#[tokio::test]
async fn missing_folio_never_reaches_query() {
    let ctx = setup();
    let conn = FakeConnection::with_body(r#"{"kind":"Invoice","series":"A","tax_id":"X"}"#);

    serve_one(&ctx, &conn).await;

    assert!(ctx.query.calls().is_empty());
    let events = ctx.worker.events().messages();
    assert_eq!(events.len(), 1);
    assert!(events[0].contains("folio"), "event: {}", events[0]);
    assert_eq!(conn.closes(), 1);
    assert!(conn.written().is_empty());
}

#[tokio::test]
async fn empty_body_is_a_decode_error() {
    let ctx = setup();
    let conn = FakeConnection::with_body("");

    serve_one(&ctx, &conn).await;

    assert_eq!(ctx.worker.events().messages(), vec!["empty request body"]);
    assert!(ctx.query.calls().is_empty());
}

#[tokio::test]
async fn zero_rows_never_reaches_render() {
    let ctx = setup();
    let conn = FakeConnection::with_body(invoice_body());

    serve_one(&ctx, &conn).await;

    assert!(ctx.render.calls().is_empty());
    assert_eq!(
        ctx.worker.events().messages(),
        vec!["no document found for series A folio 42"]
    );
    assert_eq!(ctx.notifier.messages(), ctx.worker.events().messages());
    assert_eq!(conn.closes(), 1);
    assert!(conn.header(FILE_NAME_HEADER).is_none());
}

#[tokio::test]
async fn first_row_wins_by_default() {
    let ctx = setup();
    ctx.query.set_rows(vec![
        lookup_row(42, "uuid-first", 7),
        lookup_row(42, "uuid-second", 8),
    ]);
    let conn = FakeConnection::with_body(invoice_body());

    serve_one(&ctx, &conn).await;

    assert_eq!(
        ctx.worker.events().messages(),
        vec!["sent A_42_uuid-first.zip"]
    );
}

#[tokio::test]
async fn reject_policy_fails_ambiguous_lookups() {
    let ctx = setup_with(|config| config.multiple_rows = dw_core::MultipleRows::Reject);
    ctx.query.set_rows(vec![
        lookup_row(42, "uuid-first", 7),
        lookup_row(42, "uuid-second", 8),
    ]);
    let conn = FakeConnection::with_body(invoice_body());

    serve_one(&ctx, &conn).await;

    assert!(ctx.render.calls().is_empty());
    assert_eq!(
        ctx.worker.events().messages(),
        vec!["2 documents match series A folio 42"]
    );
}

#[tokio::test]
async fn unreadable_row_is_reported() {
    let ctx = setup();
    ctx.query
        .set_rows(vec![vec![serde_json::json!(42), serde_json::json!("uuid")]]);
    let conn = FakeConnection::with_body(invoice_body());

    serve_one(&ctx, &conn).await;

    assert_eq!(
        ctx.worker.events().messages(),
        vec!["unreadable lookup row: column 2 is not an integer"]
    );
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    Query,
    Document,
    Export,
    Archive,
}

#[yare::parameterized(
    query    = { Failure::Query, "query failed: login timeout" },
    document = { Failure::Document, "render failed: template missing" },
    export   = { Failure::Export, "render failed: export schema" },
    archive  = { Failure::Archive, "packaging failed: disk full" },
)]
fn collaborator_failure_is_recorded_verbatim(failure: Failure, expected: &str) {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async {
            let ctx = setup();
            ctx.query.set_rows(vec![lookup_row(42, "uuid-42", 7)]);
            match failure {
                Failure::Query => ctx.query.set_error("login timeout"),
                Failure::Document => ctx.render.fail_documents("template missing"),
                Failure::Export => ctx.render.fail_exports("export schema"),
                Failure::Archive => ctx.archive.set_error("disk full"),
            }
            let conn = FakeConnection::with_body(invoice_body());

            serve_one(&ctx, &conn).await;

            assert_eq!(ctx.worker.events().messages(), vec![expected]);
            assert_eq!(ctx.notifier.messages(), vec![expected]);
            assert_eq!(conn.closes(), 1);
            assert!(conn.written().is_empty());
        });
}

#[tokio::test]
async fn close_failure_after_write_is_a_transport_error() {
    let ctx = setup();
    ctx.query.set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    let conn = FakeConnection::with_body(invoice_body()).failing_close();

    serve_one(&ctx, &conn).await;

    assert_eq!(
        ctx.worker.events().messages(),
        vec!["connection closed by peer"]
    );
}

#[tokio::test]
async fn deadline_expiry_closes_connection() {
    let ctx = setup_with(|config| config.request_timeout = Some(Duration::from_millis(50)));
    ctx.query.set_rows(vec![lookup_row(42, "uuid-42", 7)]);
    ctx.render.hold();
    let conn = FakeConnection::with_body(invoice_body());

    serve_one(&ctx, &conn).await;

    assert_eq!(
        ctx.worker.events().messages(),
        vec!["request exceeded its 0.05s deadline"]
    );
    assert_eq!(conn.closes(), 1);
    assert!(conn.written().is_empty());
}

#[tokio::test]
async fn failed_request_does_not_stop_the_worker() {
    let ctx = setup();
    let bad = FakeConnection::with_body("not json");
    serve_one(&ctx, &bad).await;

    ctx.query.set_rows(vec![lookup_row(43, "uuid-43", 9)]);
    let good = FakeConnection::with_body(invoice_body_with_folio(43));
    ctx.worker.admit(good.boxed()).unwrap();
    let notifier = ctx.notifier.clone();
    wait_until("second request", move || notifier.calls().len() == 2).await;

    assert!(ctx.worker.state().is_running());
    assert_eq!(ctx.worker.events().messages()[1], "sent A_43_uuid-43.zip");
}
