// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parameterized lookup query for resolving a request to a document row.

use crate::request::DocumentRequest;
use serde::{Deserialize, Serialize};

/// Longest table name accepted in configuration.
const MAX_TABLE_NAME_LEN: usize = 128;

/// A bound query parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryParam {
    Int(i64),
    Text(String),
}

/// SQL text plus named parameters. Request values never appear in `sql`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupQuery {
    pub sql: String,
    pub params: Vec<(String, QueryParam)>,
}

impl LookupQuery {
    /// Build the document lookup for `table`.
    ///
    /// Selected columns, in order: `doc_num`, `unique_id`, `doc_entry`.
    /// The table name must already have passed [`is_valid_table_name`].
    pub fn for_document(table: &str, request: &DocumentRequest) -> Self {
        let sql = format!(
            "SELECT doc_num, unique_id, doc_entry FROM {table} \
             WHERE doc_num = :folio AND series = :series AND tax_id = :tax_id"
        );
        Self {
            sql,
            params: vec![
                ("folio".to_string(), QueryParam::Int(request.folio)),
                ("series".to_string(), QueryParam::Text(request.series.clone())),
                ("tax_id".to_string(), QueryParam::Text(request.tax_id.clone())),
            ],
        }
    }

    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&QueryParam> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// JSON form handed to external query executors:
    /// `{"sql": "...", "params": {"folio": 42, ...}}`
    pub fn to_json(&self) -> serde_json::Value {
        let params: serde_json::Map<String, serde_json::Value> = self
            .params
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    QueryParam::Int(n) => serde_json::Value::from(*n),
                    QueryParam::Text(s) => serde_json::Value::from(s.as_str()),
                };
                (key.clone(), value)
            })
            .collect();
        serde_json::json!({ "sql": self.sql, "params": params })
    }
}

/// Returns true if `name` is safe to splice into SQL as a table identifier.
///
/// Accepts ASCII letters, digits, `_`, and `.` for schema qualification,
/// starting with a letter or `_`.
pub fn is_valid_table_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_TABLE_NAME_LEN {
        return false;
    }
    name.split('.').all(|part| {
        let mut chars = part.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    })
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
