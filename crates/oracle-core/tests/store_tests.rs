//! Store Tests
//!
//! Persist/restore behavior against the filesystem.

use oracle_core::prelude::*;
use oracle_core::store::{persist, restore, restore_strict};
use oracle_core::StoreError;
use oracle_test_utils::{kb_with, record_order, snapshot, test_id};
use pretty_assertions::assert_eq;
use std::fs;

fn learned() -> KnowledgeBase {
    let pool: Vec<_> = (0..5).map(test_id).collect();
    let mut kb = kb_with(&pool);
    kb.admit(pool[0], "Unofficial Patch");
    record_order(&mut kb, &[pool[0], pool[2], pool[1]], Outcome::Pass);
    record_order(&mut kb, &[pool[3], pool[4]], Outcome::Fail);
    kb
}

#[test]
fn round_trip_is_observably_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.bin");
    let kb = learned();

    persist(&kb, &path).unwrap();
    let restored = restore_strict(&path).unwrap();

    assert_eq!(restored, kb);
    assert_eq!(snapshot(&restored, Polarity::Success), snapshot(&kb, Polarity::Success));
    assert_eq!(snapshot(&restored, Polarity::Failure), snapshot(&kb, Polarity::Failure));
    assert_eq!(restored.display_name(&test_id(0)), "Unofficial Patch");
}

#[test]
fn persist_overwrites_previous_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.bin");

    persist(&kb_with(&[test_id(1)]), &path).unwrap();
    let kb = learned();
    persist(&kb, &path).unwrap();

    assert_eq!(restore(&path), kb);
}

#[test]
fn corrupt_store_restores_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.bin");
    fs::write(&path, b"definitely not a knowledge base").unwrap();

    assert!(matches!(restore_strict(&path), Err(StoreError::Corrupt { .. })));
    assert!(restore(&path).is_empty());
}

#[test]
fn truncated_store_is_never_partially_trusted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.bin");
    persist(&learned(), &path).unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(restore(&path).is_empty());
}

#[test]
fn restored_knowledge_keeps_learning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.bin");
    persist(&learned(), &path).unwrap();

    let mut kb = restore(&path);
    let newcomer = test_id(42);
    kb.get_or_create(newcomer);

    assert_eq!(kb.relation_set(&newcomer, Polarity::Success).unwrap().len(), kb.len() - 1);
}
