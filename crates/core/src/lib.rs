// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dw-core: Core types for the document worker

pub mod artifact;
pub mod attributes;
pub mod credentials;
pub mod event_log;
pub mod id;
pub mod query;
pub mod record;
pub mod request;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use artifact::{artifact_base_name, Archive, Artifact, ArtifactKind};
pub use attributes::{AttributeKey, AttributeValue, Attributes};
pub use credentials::SqlCredentials;
pub use event_log::{EventEntry, EventLog, EVENT_LOG_CAPACITY};
pub use id::RequestId;
pub use query::{is_valid_table_name, LookupQuery, QueryParam};
pub use record::{resolve_record, MultipleRows, RecordError, ResolvedRecord, Row};
pub use request::{DecodeError, DocumentRequest};
pub use state::WorkerState;
