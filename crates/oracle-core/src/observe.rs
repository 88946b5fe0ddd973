//! Observation recorder
//!
//! Recording a trial retires, from the relation graph of the matching
//! polarity, every direction the trial exercised: if `x` ran before `y`,
//! `x` is removed from `y`'s set. The two graphs never influence each
//! other. Nothing is persisted here.

use crate::error::KnowledgeError;
use crate::knowledge::KnowledgeBase;
use crate::relation::Polarity;
use crate::trial::{Outcome, Trial};

/// What one call to [`record`] changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordSummary {
    /// Positions in the trial, environment included
    pub positions: usize,
    /// Relations retired by this trial
    pub removed: usize,
}

impl From<Outcome> for Polarity {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Pass => Polarity::Success,
            Outcome::Fail => Polarity::Failure,
        }
    }
}

/// Prune the relation graph selected by `outcome` using `trial`
///
/// All identifiers are checked before anything is mutated, so a rejected
/// trial leaves the knowledge base untouched.
///
/// # Errors
/// [`KnowledgeError::NotFound`] if the trial references an identifier that
/// was never admitted.
pub fn record(kb: &mut KnowledgeBase, trial: &Trial, outcome: Outcome) -> Result<RecordSummary, KnowledgeError> {
    let sequence: Vec<_> = trial.sequence().collect();
    for id in &sequence {
        kb.require(id)?;
    }

    let graph = kb.graph_mut(outcome.into());
    let mut removed = 0;
    for (i, later) in sequence.iter().enumerate() {
        for earlier in &sequence[..i] {
            if graph.remove(later, earlier) {
                removed += 1;
            }
        }
    }

    tracing::info!(
        positions = sequence.len(),
        removed,
        outcome = ?outcome,
        "run recorded"
    );
    Ok(RecordSummary {
        positions: sequence.len(),
        removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_identity::ComponentId;

    fn id(n: u8) -> ComponentId {
        ComponentId::new([n; 32])
    }

    fn kb_with(ids: &[ComponentId]) -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        for id in ids {
            kb.get_or_create(*id);
        }
        kb
    }

    #[test]
    fn pass_prunes_success_only() {
        let env = id(0);
        let (a, b) = (id(1), id(2));
        let mut kb = kb_with(&[env, a, b]);

        let summary = record(&mut kb, &Trial::new(env, vec![a, b]), Outcome::Pass).unwrap();
        assert_eq!(summary, RecordSummary { positions: 3, removed: 3 });

        assert!(!kb.graph(Polarity::Success).contains(&b, &a));
        assert!(kb.graph(Polarity::Success).contains(&a, &b));
        assert!(kb.graph(Polarity::Failure).contains(&b, &a));
    }

    #[test]
    fn fail_prunes_failure_only() {
        let env = id(0);
        let (a, b) = (id(1), id(2));
        let mut kb = kb_with(&[env, a, b]);

        record(&mut kb, &Trial::new(env, vec![a, b]), Outcome::Fail).unwrap();
        assert!(!kb.graph(Polarity::Failure).contains(&b, &a));
        assert!(kb.graph(Polarity::Success).contains(&b, &a));
    }

    #[test]
    fn repeated_trial_removes_nothing_new() {
        let env = id(0);
        let mut kb = kb_with(&[env, id(1), id(2), id(3)]);
        let trial = Trial::new(env, vec![id(3), id(1), id(2)]);

        record(&mut kb, &trial, Outcome::Pass).unwrap();
        let again = record(&mut kb, &trial, Outcome::Pass).unwrap();
        assert_eq!(again.removed, 0);
    }

    #[test]
    fn unknown_identifier_leaves_state_untouched() {
        let env = id(0);
        let mut kb = kb_with(&[env, id(1), id(2)]);
        let before = kb.clone();

        let err = record(&mut kb, &Trial::new(env, vec![id(1), id(2), id(9)]), Outcome::Pass).unwrap_err();
        assert_eq!(err, KnowledgeError::NotFound(id(9)));
        assert_eq!(kb, before);
    }
}
