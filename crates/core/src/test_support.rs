// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::record::Row;
use crate::request::DocumentRequest;
use serde_json::json;

/// The canonical invoice request used across test suites.
pub fn invoice_request() -> DocumentRequest {
    DocumentRequest {
        kind: "Invoice".to_string(),
        series: "A".to_string(),
        tax_id: "XYZ010101AAA".to_string(),
        folio: 42,
    }
}

/// JSON body for [`invoice_request`].
pub fn invoice_body() -> Vec<u8> {
    br#"{"kind":"Invoice","series":"A","tax_id":"XYZ010101AAA","folio":42}"#.to_vec()
}

/// JSON body for an invoice request with the given folio.
pub fn invoice_body_with_folio(folio: i64) -> Vec<u8> {
    format!(r#"{{"kind":"Invoice","series":"A","tax_id":"XYZ010101AAA","folio":{folio}}}"#)
        .into_bytes()
}

/// A lookup row in query column order: `doc_num, unique_id, doc_entry`.
pub fn lookup_row(folio: i64, unique_id: &str, entry_id: i64) -> Row {
    vec![json!(folio), json!(unique_id), json!(entry_id)]
}
