// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn row(entry: Value, uuid: Value) -> Row {
    vec![json!(42), uuid, entry]
}

#[test]
fn resolves_single_row() {
    let rows = vec![row(json!(7), json!("uuid-42"))];
    let record = resolve_record(&rows, MultipleRows::First).unwrap();
    assert_eq!(
        record,
        ResolvedRecord {
            entry_id: 7,
            unique_id: "uuid-42".to_string(),
        }
    );
}

#[test]
fn zero_rows_is_not_found() {
    assert_eq!(
        resolve_record(&[], MultipleRows::First),
        Err(RecordError::NotFound)
    );
}

#[test]
fn first_policy_takes_first_of_many() {
    let rows = vec![
        row(json!(7), json!("uuid-first")),
        row(json!(8), json!("uuid-second")),
    ];
    let record = resolve_record(&rows, MultipleRows::First).unwrap();
    assert_eq!(record.unique_id, "uuid-first");
    assert_eq!(record.entry_id, 7);
}

#[test]
fn reject_policy_fails_on_many() {
    let rows = vec![
        row(json!(7), json!("uuid-first")),
        row(json!(8), json!("uuid-second")),
        row(json!(9), json!("uuid-third")),
    ];
    assert_eq!(
        resolve_record(&rows, MultipleRows::Reject),
        Err(RecordError::Ambiguous(3))
    );
}

#[test]
fn reject_policy_accepts_single_row() {
    let rows = vec![row(json!(7), json!("uuid-42"))];
    assert!(resolve_record(&rows, MultipleRows::Reject).is_ok());
}

#[yare::parameterized(
    numeric_string_entry = { json!("7"), json!("u"), Ok(7) },
    float_entry          = { json!(7.5), json!("u"), Err(DOC_ENTRY_COLUMN) },
    null_entry           = { json!(null), json!("u"), Err(DOC_ENTRY_COLUMN) },
    empty_unique_id      = { json!(7), json!(" "), Err(UNIQUE_ID_COLUMN) },
    null_unique_id       = { json!(7), json!(null), Err(UNIQUE_ID_COLUMN) },
)]
fn column_coercion(entry: Value, uuid: Value, expected: Result<i64, usize>) {
    let result = ResolvedRecord::from_row(&row(entry, uuid));
    match (result, expected) {
        (Ok(record), Ok(id)) => assert_eq!(record.entry_id, id),
        (Err(RecordError::Column { index, .. }), Err(col)) => assert_eq!(index, col),
        (other, expected) => panic!("got {other:?}, expected {expected:?}"),
    }
}

#[test]
fn short_row_is_column_error() {
    let result = ResolvedRecord::from_row(&[json!(42)]);
    assert!(matches!(result, Err(RecordError::Column { .. })));
}

#[test]
fn multiple_rows_policy_parses_lowercase() {
    let first: MultipleRows = serde_json::from_str("\"first\"").unwrap();
    let reject: MultipleRows = serde_json::from_str("\"reject\"").unwrap();
    assert_eq!(first, MultipleRows::First);
    assert_eq!(reject, MultipleRows::Reject);
    assert_eq!(MultipleRows::default(), MultipleRows::First);
}
