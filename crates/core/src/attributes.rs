// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker attribute map read by the administration surface.

use crate::event_log::EventLog;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Fixed set of attribute keys every worker exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeKey {
    DocumentKind,
    TemplatePath,
    TableName,
    QueueLength,
    Events,
}

impl AttributeKey {
    pub const ALL: [AttributeKey; 5] = [
        AttributeKey::DocumentKind,
        AttributeKey::TemplatePath,
        AttributeKey::TableName,
        AttributeKey::QueueLength,
        AttributeKey::Events,
    ];
}

/// Heterogeneous attribute value.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Path(PathBuf),
    Count(usize),
    /// Live handle onto the worker's event log.
    Events(EventLog),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<usize> {
        match self {
            AttributeValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_events(&self) -> Option<&EventLog> {
        match self {
            AttributeValue::Events(log) => Some(log),
            _ => None,
        }
    }
}

/// Attribute map keyed by [`AttributeKey`].
pub type Attributes = BTreeMap<AttributeKey, AttributeValue>;
