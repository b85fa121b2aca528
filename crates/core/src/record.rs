// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolution of lookup rows into a document record.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One result row, columns in query order.
pub type Row = Vec<Value>;

/// Column holding the unique document identifier (UUID-like).
pub const UNIQUE_ID_COLUMN: usize = 1;

/// Column holding the document entry identifier.
pub const DOC_ENTRY_COLUMN: usize = 2;

/// What to do when more than one row matches the business keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultipleRows {
    /// Package the first returned row.
    #[default]
    First,
    /// Fail the request.
    Reject,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("no document matches the request")]
    NotFound,
    #[error("{0} documents match the request")]
    Ambiguous(usize),
    #[error("column {index} is not {expected}")]
    Column { index: usize, expected: &'static str },
}

/// The row matched by a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRecord {
    pub entry_id: i64,
    pub unique_id: String,
}

impl ResolvedRecord {
    /// Read the record from a single row.
    pub fn from_row(row: &[Value]) -> Result<Self, RecordError> {
        let entry_id = match row.get(DOC_ENTRY_COLUMN) {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or(RecordError::Column {
            index: DOC_ENTRY_COLUMN,
            expected: "an integer",
        })?;

        let unique_id = match row.get(UNIQUE_ID_COLUMN) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(RecordError::Column {
                    index: UNIQUE_ID_COLUMN,
                    expected: "a non-empty identifier",
                })
            }
        };

        Ok(Self {
            entry_id,
            unique_id,
        })
    }
}

/// Pick the record out of lookup results according to `policy`.
pub fn resolve_record(rows: &[Row], policy: MultipleRows) -> Result<ResolvedRecord, RecordError> {
    match (rows, policy) {
        ([], _) => Err(RecordError::NotFound),
        ([_, _, ..], MultipleRows::Reject) => Err(RecordError::Ambiguous(rows.len())),
        ([first, ..], _) => ResolvedRecord::from_row(first),
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
