//! Order audit
//!
//! Flags pairs of a proposed order whose only confirmed-safe direction is
//! the opposite one: `later` was retired from `earlier`'s pending-success
//! set (some passing trial ran `later` first) while `earlier` is still
//! pending after `later` (no passing trial ever confirmed the proposed
//! direction). Pairs never disambiguated, or confirmed in the proposed
//! direction, are not flagged.

use crate::error::KnowledgeError;
use crate::knowledge::KnowledgeBase;
use crate::relation::Polarity;
use oracle_identity::ComponentId;
use serde::{Deserialize, Serialize};

/// A pair placed in an order that contradicts confirmed evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlaggedPair {
    /// Component placed first in the proposed order
    pub earlier: ComponentId,
    /// Component placed after it
    pub later: ComponentId,
}

impl FlaggedPair {
    /// Create flagged pair
    #[inline]
    #[must_use]
    pub const fn new(earlier: ComponentId, later: ComponentId) -> Self {
        Self { earlier, later }
    }
}

impl From<(ComponentId, ComponentId)> for FlaggedPair {
    fn from((earlier, later): (ComponentId, ComponentId)) -> Self {
        Self::new(earlier, later)
    }
}

/// Check `order` against accumulated evidence
///
/// Returns flagged pairs in position order; empty means no contradiction.
///
/// # Errors
/// [`KnowledgeError::NotFound`] if `order` references an unknown identifier.
pub fn audit(kb: &KnowledgeBase, order: &[ComponentId]) -> Result<Vec<FlaggedPair>, KnowledgeError> {
    for id in order {
        kb.require(id)?;
    }

    let graph = kb.graph(Polarity::Success);
    let mut flagged = Vec::new();
    for (i, earlier) in order.iter().enumerate() {
        for later in &order[i + 1..] {
            if earlier == later {
                continue;
            }
            if !graph.contains(earlier, later) && graph.contains(later, earlier) {
                flagged.push(FlaggedPair::new(*earlier, *later));
            }
        }
    }

    if !flagged.is_empty() {
        tracing::debug!(pairs = flagged.len(), "proposed order contradicts evidence");
    }
    Ok(flagged)
}
