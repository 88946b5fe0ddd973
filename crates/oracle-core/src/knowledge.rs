//! Knowledge base of component records and pending relations
//!
//! The [`KnowledgeBase`] is the single owner and the single mutator of
//! everything learned so far. Mutation requires `&mut`, so one writer at a
//! time is enforced statically; shared references may be read concurrently.

use crate::error::{ImageError, KnowledgeError};
use crate::relation::{Polarity, RelationGraph};
use oracle_identity::ComponentId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Everything the knowledge base remembers about one identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    id: ComponentId,
    /// Most recent name the component was seen under
    pub display_name: String,
}

impl ComponentRecord {
    /// New record named after its identifier
    #[must_use]
    pub fn new(id: ComponentId) -> Self {
        Self {
            id,
            display_name: id.to_hex(),
        }
    }

    /// Immutable identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }
}

/// Records plus the two pending relation graphs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    records: BTreeMap<ComponentId, ComponentRecord>,
    pending_success: RelationGraph,
    pending_failure: RelationGraph,
}

impl KnowledgeBase {
    /// Create empty knowledge base
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts, rejecting inconsistent state
    pub(crate) fn from_parts(
        records: Vec<ComponentRecord>,
        pending_success: RelationGraph,
        pending_failure: RelationGraph,
    ) -> Result<Self, ImageError> {
        let count = records.len();
        let records: BTreeMap<ComponentId, ComponentRecord> =
            records.into_iter().map(|r| (r.id, r)).collect();
        if records.len() != count {
            return Err(ImageError::DuplicateRecords);
        }

        let known: BTreeSet<ComponentId> = records.keys().copied().collect();
        pending_success.validate(Polarity::Success, &known)?;
        pending_failure.validate(Polarity::Failure, &known)?;

        Ok(Self {
            records,
            pending_success,
            pending_failure,
        })
    }

    /// Existing record, or a new one seeded against every known identifier
    ///
    /// This is the only operation that adds relation entries.
    pub fn get_or_create(&mut self, id: ComponentId) -> &ComponentRecord {
        self.ensure(id);
        self.records.entry(id).or_insert_with(|| ComponentRecord::new(id))
    }

    /// [`get_or_create`](Self::get_or_create), then refresh the display name
    pub fn admit(&mut self, id: ComponentId, display_name: &str) -> &ComponentRecord {
        self.ensure(id);
        let record = self.records.entry(id).or_insert_with(|| ComponentRecord::new(id));
        if record.display_name != display_name {
            tracing::debug!(id = %id.short(), from = %record.display_name, to = display_name, "renamed");
            record.display_name = display_name.to_string();
        }
        record
    }

    fn ensure(&mut self, id: ComponentId) {
        if self.records.contains_key(&id) {
            return;
        }
        let known: Vec<ComponentId> = self.records.keys().copied().collect();
        self.pending_success.seed(id, &known);
        self.pending_failure.seed(id, &known);
        self.records.insert(id, ComponentRecord::new(id));
        tracing::debug!(id = %id.short(), known = known.len(), "new component record");
    }

    /// Non-creating lookup
    #[inline]
    #[must_use]
    pub fn get(&self, id: &ComponentId) -> Option<&ComponentRecord> {
        self.records.get(id)
    }

    /// Non-creating lookup that fails on absence
    ///
    /// # Errors
    /// [`KnowledgeError::NotFound`] for identifiers never admitted
    pub fn require(&self, id: &ComponentId) -> Result<&ComponentRecord, KnowledgeError> {
        self.records.get(id).ok_or(KnowledgeError::NotFound(*id))
    }

    /// Whether the identifier has a record
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.records.contains_key(id)
    }

    /// Relation set of `id` for the given polarity
    #[must_use]
    pub fn relation_set(&self, id: &ComponentId, polarity: Polarity) -> Option<&BTreeSet<ComponentId>> {
        self.graph(polarity).get(id)
    }

    /// Read-only relation graph
    #[inline]
    #[must_use]
    pub fn graph(&self, polarity: Polarity) -> &RelationGraph {
        match polarity {
            Polarity::Success => &self.pending_success,
            Polarity::Failure => &self.pending_failure,
        }
    }

    pub(crate) fn graph_mut(&mut self, polarity: Polarity) -> &mut RelationGraph {
        match polarity {
            Polarity::Success => &mut self.pending_success,
            Polarity::Failure => &mut self.pending_failure,
        }
    }

    /// All records in identifier order
    pub fn records(&self) -> impl Iterator<Item = &ComponentRecord> {
        self.records.values()
    }

    /// Display name of `id`, falling back to its short hex
    #[must_use]
    pub fn display_name(&self, id: &ComponentId) -> String {
        self.records
            .get(id)
            .map_or_else(|| id.short(), |r| r.display_name.clone())
    }

    /// Records whose display name starts with `prefix`, ignoring case
    #[must_use]
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&ComponentRecord> {
        let prefix = prefix.to_lowercase();
        self.records
            .values()
            .filter(|r| r.display_name.to_lowercase().starts_with(&prefix))
            .collect()
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been admitted yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
