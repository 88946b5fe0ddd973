//! Host abstraction
//!
//! The host owns the live component list, activation state and priorities.
//! A session only reads the list and writes priorities back.

use crate::error::HostError;
use oracle_identity::ComponentRef;
use serde::{Deserialize, Serialize};

/// Application that owns the ordered component collection
pub trait ComponentHost {
    /// Current components, in any order
    fn components(&self) -> Vec<ComponentRef>;

    /// Assign new priorities by component name
    ///
    /// # Errors
    /// [`HostError::UnknownComponent`] if a name is not in the collection;
    /// nothing is changed in that case.
    fn apply_priorities(&mut self, priorities: &[(String, usize)]) -> Result<(), HostError>;

    /// Active components in priority order
    fn active_in_order(&self) -> Vec<ComponentRef> {
        let mut active: Vec<ComponentRef> = self.components().into_iter().filter(|c| c.active).collect();
        active.sort_by_key(|c| c.priority);
        active
    }
}

/// In-memory host, kept sorted by priority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryHost {
    components: Vec<ComponentRef>,
}

impl MemoryHost {
    /// Create host from a component list
    #[must_use]
    pub fn new(components: Vec<ComponentRef>) -> Self {
        let mut host = Self { components };
        host.sort();
        host
    }

    /// Add a component
    pub fn push(&mut self, component: ComponentRef) {
        self.components.push(component);
        self.sort();
    }

    /// Component by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ComponentRef> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Enable or disable a component
    ///
    /// # Errors
    /// [`HostError::UnknownComponent`]
    pub fn set_active(&mut self, name: &str, active: bool) -> Result<(), HostError> {
        let component = self
            .components
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| HostError::UnknownComponent(name.to_string()))?;
        component.active = active;
        Ok(())
    }

    /// Component names in priority order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }

    fn sort(&mut self) {
        self.components.sort_by_key(|c| c.priority);
    }
}

impl ComponentHost for MemoryHost {
    fn components(&self) -> Vec<ComponentRef> {
        self.components.clone()
    }

    fn apply_priorities(&mut self, priorities: &[(String, usize)]) -> Result<(), HostError> {
        if let Some((name, _)) = priorities.iter().find(|(name, _)| self.get(name).is_none()) {
            return Err(HostError::UnknownComponent(name.clone()));
        }
        for (name, priority) in priorities {
            for component in self.components.iter_mut().filter(|c| &c.name == name) {
                component.priority = *priority;
            }
        }
        self.sort();
        Ok(())
    }
}
