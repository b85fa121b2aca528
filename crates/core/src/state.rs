// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a worker accepts and processes requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Running,
    #[default]
    Stopped,
}

impl WorkerState {
    pub fn is_running(self) -> bool {
        self == WorkerState::Running
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Running => write!(f, "running"),
            WorkerState::Stopped => write!(f, "stopped"),
        }
    }
}
