// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{fake_registry, wait_until};

#[test]
fn workers_are_keyed_by_kind() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _fakes) = fake_registry(dir.path());

    assert_eq!(registry.len(), 2);
    let kinds: Vec<&str> = registry.iter().map(|w| w.kind()).collect();
    assert_eq!(kinds, vec!["CreditNote", "Invoice"]);
    assert!(registry.get("Invoice").is_some());
    assert!(registry.get("invoice").is_none());
}

#[tokio::test]
async fn start_and_stop_by_kind() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _fakes) = fake_registry(dir.path());

    registry.start("Invoice").unwrap();
    let r = Arc::clone(&registry);
    wait_until("invoice running", move || {
        r.get("Invoice").is_some_and(|w| w.state().is_running())
    })
    .await;
    assert!(!registry.get("CreditNote").unwrap().state().is_running());

    assert!(matches!(
        registry.start("Invoice"),
        Err(RegistryError::Worker(WorkerError::LoopActive(_)))
    ));

    registry.stop("Invoice").unwrap();
    assert!(registry.wait_idle(Duration::from_secs(5)).await);
    assert!(!registry.get("Invoice").unwrap().is_loop_active());
}

#[tokio::test]
async fn start_is_running_on_return() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _fakes) = fake_registry(dir.path());

    registry.start("Invoice").unwrap();

    let invoice = registry.get("Invoice").unwrap();
    assert!(invoice.state().is_running());
    assert!(invoice.is_loop_active());
    registry.stop_all();
}

#[tokio::test]
async fn back_to_back_starts_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _fakes) = fake_registry(dir.path());

    let first = registry.start("Invoice");
    let second = registry.start("Invoice");

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(RegistryError::Worker(WorkerError::LoopActive(kind))) if kind == "Invoice"
    ));
    registry.stop_all();
    assert!(registry.wait_idle(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn restart_right_after_stop_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _fakes) = fake_registry(dir.path());
    registry.start("Invoice").unwrap();

    registry.stop("Invoice").unwrap();
    registry.start("Invoice").unwrap();

    let invoice = Arc::clone(registry.get("Invoice").unwrap());
    assert!(invoice.state().is_running());
    // Give a loop that saw the stop time to exit; one must still own the queue.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(invoice.is_loop_active());
    assert!(invoice.state().is_running());

    registry.stop("Invoice").unwrap();
    assert!(registry.wait_idle(Duration::from_secs(5)).await);
    assert_eq!(invoice.events().messages(), vec!["stopped", "stopped"]);
}

#[tokio::test]
async fn repeated_stop_logs_once() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _fakes) = fake_registry(dir.path());
    registry.start("Invoice").unwrap();

    registry.stop("Invoice").unwrap();
    registry.stop("Invoice").unwrap();
    registry.stop("CreditNote").unwrap();

    assert_eq!(
        registry.get("Invoice").unwrap().events().messages(),
        vec!["stopped"]
    );
    assert!(registry.get("CreditNote").unwrap().events().is_empty());
    assert!(registry.wait_idle(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn unknown_kind_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _fakes) = fake_registry(dir.path());

    assert!(matches!(
        registry.start("Receipt"),
        Err(RegistryError::UnknownKind(kind)) if kind == "Receipt"
    ));
    assert!(registry.stop("Receipt").is_err());
}

#[tokio::test]
async fn stop_all_stops_only_running_workers() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _fakes) = fake_registry(dir.path());
    registry.start("Invoice").unwrap();
    let r = Arc::clone(&registry);
    wait_until("invoice running", move || {
        r.get("Invoice").is_some_and(|w| w.state().is_running())
    })
    .await;

    registry.stop_all();

    assert!(registry.wait_idle(Duration::from_secs(5)).await);
    let invoice = registry.get("Invoice").unwrap();
    assert_eq!(invoice.events().messages(), vec!["stopped"]);
    // A worker that never ran gets no shutdown entry
    assert!(registry.get("CreditNote").unwrap().events().is_empty());
}
