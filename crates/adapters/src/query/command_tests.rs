// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dw_core::test_support::invoice_request;
use serde_json::json;

fn creds() -> SqlCredentials {
    SqlCredentials {
        server: "db01".to_string(),
        database: "sales".to_string(),
        user: "reader".to_string(),
        password: "secret".to_string(),
    }
}

fn sh(script: &str) -> CommandQueryAdapter {
    CommandQueryAdapter::new("sh", vec!["-c".to_string(), script.to_string()])
}

#[test]
fn parse_rows_reads_array_of_arrays() {
    let rows = parse_rows(br#"[[42, "uuid-42", 7], [43, "uuid-43", 8]]"#).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], vec![json!(42), json!("uuid-42"), json!(7)]);
}

#[test]
fn parse_rows_accepts_empty_result() {
    assert!(parse_rows(b"[]").unwrap().is_empty());
}

#[yare::parameterized(
    not_json   = { b"garbage" },
    not_array  = { br#"{"rows": []}"# },
    row_object = { br#"[{"a": 1}]"# },
)]
fn parse_rows_rejects_bad_output(stdout: &[u8]) {
    assert!(matches!(
        parse_rows(stdout),
        Err(QueryError::InvalidOutput(_))
    ));
}

#[tokio::test]
async fn execute_sends_query_on_stdin_and_credentials_in_env() {
    // Echo back the folio param and the server env var as a single row.
    let adapter = sh(
        r#"input=$(cat); case "$input" in *'"folio":42'*) f=42;; *) f=0;; esac; printf '[[%s, "%s", 7]]' "$f" "$DW_SQL_SERVER""#,
    );
    let query = LookupQuery::for_document("OINV", &invoice_request());

    let rows = adapter.execute(&creds(), &query).await.unwrap();

    assert_eq!(rows, vec![vec![json!(42), json!("db01"), json!(7)]]);
}

#[tokio::test]
async fn execute_reports_stderr_on_failure() {
    let adapter = sh("echo 'login failed for user' >&2; exit 1");
    let query = LookupQuery::for_document("OINV", &invoice_request());

    let err = adapter.execute(&creds(), &query).await.unwrap_err();

    assert!(err.to_string().contains("login failed for user"), "{err}");
}

#[tokio::test]
async fn execute_times_out() {
    let adapter = sh("sleep 10").with_timeout(Duration::from_millis(100));
    let query = LookupQuery::for_document("OINV", &invoice_request());

    let err = adapter.execute(&creds(), &query).await.unwrap_err();

    assert!(err.to_string().contains("timed out"), "{err}");
}
