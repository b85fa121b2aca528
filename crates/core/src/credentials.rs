// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Relational store credentials.

use serde::Deserialize;
use std::fmt;

/// Connection details for the relational store.
///
/// Immutable after startup and shared read-only by every worker.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SqlCredentials {
    pub server: String,
    pub database: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

impl SqlCredentials {
    /// Environment variables handed to external programs that need the store.
    pub fn env(&self) -> Vec<(String, String)> {
        vec![
            ("DW_SQL_SERVER".to_string(), self.server.clone()),
            ("DW_SQL_DATABASE".to_string(), self.database.clone()),
            ("DW_SQL_USER".to_string(), self.user.clone()),
            ("DW_SQL_PASSWORD".to_string(), self.password.clone()),
        ]
    }
}

impl fmt::Debug for SqlCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlCredentials")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}
