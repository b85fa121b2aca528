// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration file.
//!
//! ```toml
//! listen = "127.0.0.1:8750"
//!
//! [database]
//! server = "db.local"
//! database = "sales"
//!
//! [query]
//! program = "dw-query"
//!
//! [render]
//! program = "dw-render"
//!
//! [[worker]]
//! kind = "Invoice"
//! template = "/srv/templates/invoice.rpt"
//! table = "OINV"
//! ```

use dw_core::{is_valid_table_name, MultipleRows, SqlCredentials};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default HTTP listen address
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8750";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no [[worker]] configured")]
    NoWorkers,
    #[error("document kind {0:?} is configured more than once")]
    DuplicateKind(String),
    #[error("worker {kind}: invalid table name {table:?}")]
    InvalidTable { kind: String, table: String },
    #[error("worker {kind}: {field} must be greater than zero")]
    Zero { kind: String, field: &'static str },
    #[error("{0}: program must not be empty")]
    EmptyProgram(&'static str),
}

/// External program invocation
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub timeout_secs: Option<u64>,
}

impl CommandConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_archive() -> CommandConfig {
    CommandConfig {
        program: "zip".to_string(),
        args: vec!["-j".to_string(), "-q".to_string()],
        timeout_secs: None,
    }
}

/// Where operator notifications go
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NotifyConfig {
    #[default]
    None,
    Desktop,
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

/// One `[[worker]]` table
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WorkerSection {
    pub kind: String,
    pub template: PathBuf,
    pub table: String,
    pub max_queue: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub multiple_rows: MultipleRows,
    #[serde(default = "default_autostart")]
    pub autostart: bool,
}

fn default_autostart() -> bool {
    true
}

impl WorkerSection {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Parsed configuration file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Parent of per-request scratch directories; `<state_dir>/output` when unset
    pub output_dir: Option<PathBuf>,
    pub database: SqlCredentials,
    pub query: CommandConfig,
    pub render: CommandConfig,
    #[serde(default = "default_archive")]
    pub archive: CommandConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default, rename = "worker")]
    pub workers: Vec<WorkerSection>,
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

impl DaemonConfig {
    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers.is_empty() {
            return Err(ConfigError::NoWorkers);
        }
        for (section, command) in [
            ("query", &self.query),
            ("render", &self.render),
            ("archive", &self.archive),
        ] {
            if command.program.trim().is_empty() {
                return Err(ConfigError::EmptyProgram(section));
            }
        }
        if let NotifyConfig::Command { program, .. } = &self.notify {
            if program.trim().is_empty() {
                return Err(ConfigError::EmptyProgram("notify"));
            }
        }

        let mut kinds = HashSet::new();
        for worker in &self.workers {
            if !kinds.insert(worker.kind.as_str()) {
                return Err(ConfigError::DuplicateKind(worker.kind.clone()));
            }
            if !is_valid_table_name(&worker.table) {
                return Err(ConfigError::InvalidTable {
                    kind: worker.kind.clone(),
                    table: worker.table.clone(),
                });
            }
            if worker.max_queue == Some(0) {
                return Err(ConfigError::Zero {
                    kind: worker.kind.clone(),
                    field: "max_queue",
                });
            }
            if worker.request_timeout_secs == Some(0) {
                return Err(ConfigError::Zero {
                    kind: worker.kind.clone(),
                    field: "request_timeout_secs",
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
