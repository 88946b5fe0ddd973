//! Testing utilities for the Oracle workspace
//!
//! Shared test helpers, fixtures, and assertions.

#![allow(missing_docs)]

use oracle_core::{record, KnowledgeBase, Outcome, Polarity, Trial};
use oracle_identity::{ComponentId, ComponentRef};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Deterministic identifier distinct for every `n`
pub fn test_id(n: u32) -> ComponentId {
    ComponentId::compute(format!("component-{n}").as_bytes())
}

/// Environment identifier used by tests that do not care about environments
pub fn test_env() -> ComponentId {
    ComponentId::for_environment("test-env")
}

/// Knowledge base holding the test environment and `ids`, admitted in order
pub fn kb_with(ids: &[ComponentId]) -> KnowledgeBase {
    let mut kb = KnowledgeBase::new();
    kb.get_or_create(test_env());
    for id in ids {
        kb.get_or_create(*id);
    }
    kb
}

/// Record `order` under the test environment
pub fn record_order(kb: &mut KnowledgeBase, order: &[ComponentId], outcome: Outcome) {
    record(kb, &Trial::new(test_env(), order.to_vec()), outcome).unwrap();
}

pub fn id_set(ids: &[ComponentId]) -> BTreeSet<ComponentId> {
    ids.iter().copied().collect()
}

/// Snapshot of one relation graph, for before/after comparisons
pub fn snapshot(kb: &KnowledgeBase, polarity: Polarity) -> Vec<(ComponentId, BTreeSet<ComponentId>)> {
    kb.graph(polarity)
        .iter()
        .map(|(k, v)| (*k, v.clone()))
        .collect()
}

/// Assert every set in `after` is a subset of the same set in `before`
pub fn assert_shrunk(
    before: &[(ComponentId, BTreeSet<ComponentId>)],
    after: &[(ComponentId, BTreeSet<ComponentId>)],
) {
    for (key, set) in after {
        let old = before
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, s)| s)
            .unwrap_or_else(|| panic!("relation set for {} appeared", key.short()));
        assert!(set.is_subset(old), "relation set for {} grew", key.short());
    }
}

/// On-disk component collection: a downloads folder plus one directory per component
pub struct ComponentTree {
    dir: tempfile::TempDir,
}

impl ComponentTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("downloads")).unwrap();
        fs::create_dir_all(dir.path().join("components")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn downloads(&self) -> PathBuf {
        self.dir.path().join("downloads")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    /// Component installed from an archive containing `payload`
    pub fn installed(&self, name: &str, payload: &[u8], priority: usize) -> ComponentRef {
        let root = self.dir.path().join("components").join(name);
        fs::create_dir_all(&root).unwrap();
        let archive = format!("{name}.7z");
        fs::write(self.downloads().join(&archive), payload).unwrap();
        ComponentRef::new(name, root)
            .with_install_source(archive)
            .with_priority(priority)
    }

    /// Built-in component identified by a single master file
    pub fn essential(&self, name: &str, master: &[u8], priority: usize) -> ComponentRef {
        let root = self.dir.path().join("components").join(name);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join(format!("{name}.esm")), master).unwrap();
        ComponentRef::new(name, root).essential().with_priority(priority)
    }

    /// Component with nothing on disk to identify it by
    pub fn broken(&self, name: &str, priority: usize) -> ComponentRef {
        let root = self.dir.path().join("components").join(name);
        fs::create_dir_all(&root).unwrap();
        ComponentRef::new(name, root).with_priority(priority)
    }
}

impl Default for ComponentTree {
    fn default() -> Self {
        Self::new()
    }
}
