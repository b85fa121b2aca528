// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound connection handles

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dw_core::RequestId;
use std::fmt;
use thiserror::Error;

/// Errors reading from or writing to a connection
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed by peer")]
    Closed,
    #[error("transport I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// One not-yet-answered inbound connection.
///
/// `close` consumes the handle, so a connection is closed at most once.
/// Dropping a handle without closing it leaves the transport to decide what
/// the peer observes.
#[async_trait]
pub trait Connection: Send + 'static {
    /// Read the complete request body
    async fn read_body(&mut self) -> Result<Vec<u8>, TransportError>;

    /// Attach response metadata; must precede the first write
    fn set_header(&mut self, name: &str, value: &str);

    async fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    async fn flush(&mut self) -> Result<(), TransportError>;

    /// Finish the response and release the connection
    fn close(self: Box<Self>) -> Result<(), TransportError>;
}

/// A connection waiting in an admission queue.
pub struct PendingRequest {
    pub id: RequestId,
    pub admitted_at: DateTime<Utc>,
    pub connection: Box<dyn Connection>,
}

impl PendingRequest {
    pub fn new(connection: Box<dyn Connection>) -> Self {
        Self {
            id: RequestId::generate(),
            admitted_at: Utc::now(),
            connection,
        }
    }

    /// Close the connection, logging instead of returning failures.
    pub fn close_quietly(self) {
        if let Err(e) = self.connection.close() {
            tracing::debug!(id = %self.id, error = %e, "closing dropped request failed");
        }
    }
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .field("admitted_at", &self.admitted_at)
            .finish_non_exhaustive()
    }
}
