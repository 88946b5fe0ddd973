//! Trials and their outcomes

use oracle_identity::ComponentId;
use serde::{Deserialize, Serialize};

/// Pass/fail result of one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The whole collection ran without failure
    Pass,
    /// The run failed somewhere
    Fail,
}

impl Outcome {
    /// True for [`Outcome::Pass`]
    #[inline]
    #[must_use]
    pub fn passed(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl From<bool> for Outcome {
    fn from(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

/// One concrete arrangement that actually ran
///
/// The environment identifier is the first element of the sequence, so the
/// same components under a different environment accrue separate history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    environment: ComponentId,
    order: Vec<ComponentId>,
}

impl Trial {
    /// Create trial from the environment and the components in run order
    #[must_use]
    pub fn new(environment: ComponentId, order: Vec<ComponentId>) -> Self {
        Self { environment, order }
    }

    /// Environment identifier
    #[inline]
    #[must_use]
    pub fn environment(&self) -> ComponentId {
        self.environment
    }

    /// Components in run order, without the environment
    #[inline]
    #[must_use]
    pub fn order(&self) -> &[ComponentId] {
        &self.order
    }

    /// Environment followed by components, as recorded
    pub fn sequence(&self) -> impl Iterator<Item = ComponentId> + '_ {
        std::iter::once(self.environment).chain(self.order.iter().copied())
    }

    /// Number of positions including the environment
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len() + 1
    }

    /// Trials always hold at least the environment
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}
