// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound request payload.
//!
//! Clients POST a JSON object naming the document they want:
//!
//! ```json
//! { "kind": "Invoice", "series": "A", "tax_id": "XYZ010101AAA", "folio": 42 }
//! ```
//!
//! Older clients send `Tipo`, `Serie`, `RFC` and `Folio`; those names are
//! accepted as aliases.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors decoding a request payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty request body")]
    Empty,
    #[error("invalid request payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid request field '{field}': {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

/// Business keys identifying one generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    #[serde(alias = "Tipo")]
    pub kind: String,
    #[serde(alias = "Serie")]
    pub series: String,
    #[serde(alias = "RFC")]
    pub tax_id: String,
    #[serde(alias = "Folio")]
    pub folio: i64,
}

impl DocumentRequest {
    /// Decode and validate a payload read from a connection.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(DecodeError::Empty);
        }
        let request: Self = serde_json::from_slice(bytes)?;
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<(), DecodeError> {
        for (field, value) in [
            ("kind", &self.kind),
            ("series", &self.series),
            ("tax_id", &self.tax_id),
        ] {
            if value.trim().is_empty() {
                return Err(DecodeError::InvalidField {
                    field,
                    reason: "must not be empty",
                });
            }
        }
        // series ends up in artifact file names
        if self.series.contains(['/', '\\']) || self.series.contains("..") {
            return Err(DecodeError::InvalidField {
                field: "series",
                reason: "must not contain path separators",
            });
        }
        // and inside the quoted `fileName="...";` response header
        if self.series.contains(['"', ';']) || self.series.chars().any(char::is_control) {
            return Err(DecodeError::InvalidField {
                field: "series",
                reason: "must not contain header delimiters",
            });
        }
        if self.folio < 0 {
            return Err(DecodeError::InvalidField {
                field: "folio",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
