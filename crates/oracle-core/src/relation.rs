//! Pending precedence relations
//!
//! A [`RelationGraph`] maps each identifier `h` to the set of identifiers
//! whose placement after `h` is not yet confirmed. The knowledge base keeps
//! two instances of the same type, one per [`Polarity`]. Entries are added
//! only when a new identifier is seeded; afterwards they are only removed.

use crate::error::ImageError;
use oracle_identity::ComponentId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which outcome prunes a relation graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    /// Pruned by passing trials; drives derivation and audit
    Success,
    /// Pruned by failing trials; maintained, not consumed
    Failure,
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("pending-success"),
            Self::Failure => f.write_str("pending-failure"),
        }
    }
}

/// Directed relation sets keyed by identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationGraph {
    sets: BTreeMap<ComponentId, BTreeSet<ComponentId>>,
}

impl RelationGraph {
    /// Create empty graph
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a new identifier with maximal uncertainty against `known`
    ///
    /// `id`'s set receives every other known identifier and each of those
    /// sets receives `id`.
    pub(crate) fn seed(&mut self, id: ComponentId, known: &[ComponentId]) {
        let set = self.sets.entry(id).or_default();
        set.extend(known.iter().copied().filter(|k| *k != id));
        for other in known.iter().filter(|k| **k != id) {
            self.sets.entry(*other).or_default().insert(id);
        }
    }

    /// Retire `member` from `key`'s set; returns whether it was present
    pub(crate) fn remove(&mut self, key: &ComponentId, member: &ComponentId) -> bool {
        self.sets.get_mut(key).is_some_and(|set| set.remove(member))
    }

    /// Relation set of an identifier
    #[inline]
    #[must_use]
    pub fn get(&self, id: &ComponentId) -> Option<&BTreeSet<ComponentId>> {
        self.sets.get(id)
    }

    /// Whether `to` is still pending after `from`
    #[inline]
    #[must_use]
    pub fn contains(&self, from: &ComponentId, to: &ComponentId) -> bool {
        self.sets.get(from).is_some_and(|set| set.contains(to))
    }

    /// Successors of `id` (empty for unknown identifiers)
    pub fn successors<'a>(&'a self, id: &ComponentId) -> impl Iterator<Item = &'a ComponentId> + 'a {
        self.sets.get(id).into_iter().flatten()
    }

    /// Keys in identifier order
    pub fn keys(&self) -> impl Iterator<Item = &ComponentId> {
        self.sets.keys()
    }

    /// All `(key, set)` pairs in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, &BTreeSet<ComponentId>)> {
        self.sets.iter()
    }

    /// Number of keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// True when no identifier is present
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total number of pending relations
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.sets.values().map(BTreeSet::len).sum()
    }

    /// Check the graph against the set of known identifiers
    ///
    /// Keys must equal `known`, every member must be known, and no set may
    /// contain its own key.
    pub(crate) fn validate(&self, polarity: Polarity, known: &BTreeSet<ComponentId>) -> Result<(), ImageError> {
        if self.sets.len() != known.len() || self.sets.keys().any(|k| !known.contains(k)) {
            return Err(ImageError::KeyMismatch { polarity });
        }
        for (key, set) in &self.sets {
            if set.contains(key) {
                return Err(ImageError::SelfRelation { polarity, id: *key });
            }
            if let Some(stray) = set.iter().find(|m| !known.contains(m)) {
                return Err(ImageError::UnknownMember {
                    polarity,
                    key: *key,
                    member: *stray,
                });
            }
        }
        Ok(())
    }
}
