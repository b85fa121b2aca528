// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded in-memory log of worker status messages.
//!
//! Kept so an administration surface that reconnects can still show what
//! the worker did recently. Entries are evicted oldest-first once the log
//! holds [`EVENT_LOG_CAPACITY`] messages.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Maximum number of entries retained.
pub const EVENT_LOG_CAPACITY: usize = 200;

/// A single status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

impl fmt::Display for EventEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.message
        )
    }
}

/// Shared handle to a bounded FIFO log.
///
/// Cloning yields another handle onto the same storage, so a clone handed to
/// a reader observes later appends.
#[derive(Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<VecDeque<EventEntry>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message stamped with the current time.
    pub fn append(&self, message: impl Into<String>) {
        self.append_at(Utc::now(), message);
    }

    /// Append a message with an explicit timestamp.
    pub fn append_at(&self, at: DateTime<Utc>, message: impl Into<String>) {
        let mut entries = self.entries.lock();
        while entries.len() >= EVENT_LOG_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(EventEntry {
            at,
            message: message.into(),
        });
    }

    /// Snapshot of the current entries, oldest first.
    pub fn entries(&self) -> Vec<EventEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Snapshot of the current messages, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.len())
            .finish()
    }
}

impl Serialize for EventLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries().serialize(serializer)
    }
}

#[cfg(test)]
#[path = "event_log_tests.rs"]
mod tests;
