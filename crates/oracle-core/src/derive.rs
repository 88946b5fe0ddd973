//! Order derivation
//!
//! Randomized Kahn's algorithm over the pending-success graph restricted to
//! the active components. Every edge `h → h2` (`h2` still pending after `h`)
//! places `h` before `h2`. Ties are broken uniformly at random so repeated
//! derivations explore different evidence-consistent orders.

use crate::error::DeriveError;
use crate::knowledge::KnowledgeBase;
use crate::relation::Polarity;
use oracle_identity::ComponentId;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

/// Derive a total order of `active` consistent with all pending requirements
///
/// # Errors
/// [`DeriveError::NoConsistentOrder`] when the induced subgraph still has a
/// cycle, [`DeriveError::Knowledge`] when `active` holds an unknown
/// identifier.
pub fn derive<R: Rng + ?Sized>(
    kb: &KnowledgeBase,
    active: &BTreeSet<ComponentId>,
    rng: &mut R,
) -> Result<Vec<ComponentId>, DeriveError> {
    for id in active {
        kb.require(id)?;
    }

    let graph = kb.graph(Polarity::Success);
    let active_successors = |id: &ComponentId| {
        graph
            .successors(id)
            .filter(|s| active.contains(*s))
            .copied()
            .collect::<Vec<_>>()
    };

    let mut in_degree: BTreeMap<ComponentId, usize> = active.iter().map(|id| (*id, 0)).collect();
    for id in active {
        for successor in active_successors(id) {
            if let Some(degree) = in_degree.get_mut(&successor) {
                *degree += 1;
            }
        }
    }

    let mut ready: Vec<ComponentId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut order = Vec::with_capacity(active.len());

    while !ready.is_empty() {
        let next = ready.swap_remove(rng.gen_range(0..ready.len()));
        order.push(next);
        for successor in active_successors(&next) {
            if let Some(degree) = in_degree.get_mut(&successor) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push(successor);
                }
            }
        }
    }

    if order.len() != active.len() {
        tracing::debug!(placed = order.len(), total = active.len(), "pending relations still cyclic");
        return Err(DeriveError::NoConsistentOrder {
            placed: order.len(),
            total: active.len(),
        });
    }
    Ok(order)
}

/// [`derive`] with the thread-local generator
///
/// # Errors
/// See [`derive`].
pub fn derive_with_thread_rng(
    kb: &KnowledgeBase,
    active: &BTreeSet<ComponentId>,
) -> Result<Vec<ComponentId>, DeriveError> {
    derive(kb, active, &mut rand::thread_rng())
}

/// Uniformly random permutation, used to gather evidence when derivation fails
#[must_use]
pub fn random_order<R: Rng + ?Sized>(active: &BTreeSet<ComponentId>, rng: &mut R) -> Vec<ComponentId> {
    let mut order: Vec<ComponentId> = active.iter().copied().collect();
    order.shuffle(rng);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::record;
    use crate::trial::{Outcome, Trial};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn id(n: u8) -> ComponentId {
        ComponentId::new([n; 32])
    }

    #[test]
    fn empty_active_set_derives_empty_order() {
        let kb = KnowledgeBase::new();
        let order = derive(&kb, &BTreeSet::new(), &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(order.is_empty());
    }

    #[test]
    fn single_component_is_trivially_ordered() {
        let mut kb = KnowledgeBase::new();
        kb.get_or_create(id(1));
        let order = derive(&kb, &BTreeSet::from([id(1)]), &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(order, vec![id(1)]);
    }

    #[test]
    fn fresh_pair_is_cyclic() {
        let mut kb = KnowledgeBase::new();
        kb.get_or_create(id(1));
        kb.get_or_create(id(2));
        let err = derive(&kb, &BTreeSet::from([id(1), id(2)]), &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(err, DeriveError::NoConsistentOrder { placed: 0, total: 2 });
    }

    #[test]
    fn inactive_components_do_not_constrain() {
        let env = id(0);
        let mut kb = KnowledgeBase::new();
        for n in 0..=3 {
            kb.get_or_create(id(n));
        }
        record(&mut kb, &Trial::new(env, vec![id(1), id(2)]), Outcome::Pass).unwrap();

        // id(3) is still fully ambiguous against 1 and 2 but is not active
        let order = derive(&kb, &BTreeSet::from([id(1), id(2)]), &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(order, vec![id(1), id(2)]);
    }

    #[test]
    fn unknown_active_identifier_is_reported() {
        let kb = KnowledgeBase::new();
        let err = derive(&kb, &BTreeSet::from([id(5)]), &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, DeriveError::Knowledge(_)));
    }

    #[test]
    fn random_order_is_a_permutation() {
        let active: BTreeSet<_> = (1..=8).map(id).collect();
        let mut order = random_order(&active, &mut StdRng::seed_from_u64(3));
        order.sort();
        assert_eq!(order, active.into_iter().collect::<Vec<_>>());
    }
}
