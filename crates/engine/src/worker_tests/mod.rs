// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker tests

mod lifecycle;
mod pipeline;

use super::*;
use crate::test_helpers::{setup, setup_with, spawn_loop, wait_until, FakeConnection, TestContext};
use dw_adapters::RenderCall;
use dw_core::test_support::{invoice_body, invoice_body_with_folio, lookup_row};

/// Admit `conn` to a running worker and wait until its outcome is reported.
async fn serve_one(ctx: &TestContext, conn: &FakeConnection) {
    let _loop = spawn_loop(ctx).await;
    let before = ctx.notifier.calls().len();
    ctx.worker.admit(conn.boxed()).unwrap();
    let notifier = ctx.notifier.clone();
    wait_until("request reported", move || notifier.calls().len() > before).await;
}
