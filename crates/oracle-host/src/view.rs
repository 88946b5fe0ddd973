//! Read-only graph view for visualization
//!
//! Exposes both relation graphs, display names, and the last proposed order.
//! There is no mutation path through a [`GraphView`].

use oracle_core::{KnowledgeBase, Polarity};
use oracle_identity::ComponentId;
use serde::{Deserialize, Serialize};

/// Borrowed view over a session's knowledge base
#[derive(Debug, Clone, Copy)]
pub struct GraphView<'a> {
    kb: &'a KnowledgeBase,
    last_proposed: Option<&'a [ComponentId]>,
}

impl<'a> GraphView<'a> {
    /// Create view
    #[must_use]
    pub fn new(kb: &'a KnowledgeBase, last_proposed: Option<&'a [ComponentId]>) -> Self {
        Self { kb, last_proposed }
    }

    /// Every known identifier with its display name
    pub fn nodes(&self) -> impl Iterator<Item = (ComponentId, &'a str)> + 'a {
        self.kb.records().map(|r| (r.id(), r.display_name.as_str()))
    }

    /// Pending edges `from → to` of one graph
    pub fn edges(&self, polarity: Polarity) -> impl Iterator<Item = (ComponentId, ComponentId)> + 'a {
        self.kb
            .graph(polarity)
            .iter()
            .flat_map(|(from, set)| set.iter().map(move |to| (*from, *to)))
    }

    /// Display name of an identifier
    #[must_use]
    pub fn name(&self, id: &ComponentId) -> String {
        self.kb.display_name(id)
    }

    /// Order most recently applied by the session
    #[must_use]
    pub fn last_proposed(&self) -> Option<&'a [ComponentId]> {
        self.last_proposed
    }

    /// Owned, serializable copy
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        let edges = |polarity: Polarity| -> Vec<GraphEdge> {
            self.edges(polarity)
                .map(|(from, to)| GraphEdge { from, to })
                .collect()
        };
        GraphSnapshot {
            nodes: self
                .nodes()
                .map(|(id, name)| GraphNode {
                    id,
                    name: name.to_string(),
                })
                .collect(),
            pending_success: edges(Polarity::Success),
            pending_failure: edges(Polarity::Failure),
            last_proposed: self.last_proposed.map(<[ComponentId]>::to_vec),
        }
    }
}

/// One node of a [`GraphSnapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Identifier
    pub id: ComponentId,
    /// Display name
    pub name: String,
}

/// One pending edge of a [`GraphSnapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Component that must come first
    pub from: ComponentId,
    /// Component still pending after it
    pub to: ComponentId,
}

/// Serializable state of both relation graphs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Known components
    pub nodes: Vec<GraphNode>,
    /// Pending-success edges
    pub pending_success: Vec<GraphEdge>,
    /// Pending-failure edges
    pub pending_failure: Vec<GraphEdge>,
    /// Last applied order, if any
    pub last_proposed: Option<Vec<ComponentId>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_pair_has_edges_both_ways() {
        let (a, b) = (ComponentId::new([1; 32]), ComponentId::new([2; 32]));
        let mut kb = KnowledgeBase::new();
        kb.admit(a, "A");
        kb.admit(b, "B");

        let view = GraphView::new(&kb, None);
        let edges: Vec<_> = view.edges(Polarity::Success).collect();
        assert_eq!(edges, vec![(a, b), (b, a)]);
        assert_eq!(view.nodes().map(|(_, n)| n).collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn snapshot_serializes_identifiers_as_hex() {
        let a = ComponentId::new([0xab; 32]);
        let mut kb = KnowledgeBase::new();
        kb.admit(a, "A");
        let order = [a];

        let snapshot = GraphView::new(&kb, Some(&order[..])).snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();

        assert!(json.contains(&"ab".repeat(32)));
        assert_eq!(snapshot.last_proposed, Some(vec![a]));
        assert!(snapshot.pending_success.is_empty());
    }
}
