//! Host-side component references
//!
//! A [`ComponentRef`] is what the host knows about one entry of its live
//! collection. Everything here is mutable from the host's point of view;
//! only the [`ComponentId`](crate::ComponentId) derived from it is stable.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Display-name prefixes the host adds to built-in components
const BUILTIN_PREFIXES: [&str; 2] = ["Creation Club: ", "DLC: "];

/// One component of the host's live collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    /// User-facing name, freely renameable
    pub name: String,
    /// Directory holding the component's files
    pub root: PathBuf,
    /// Original installation archive, if the host knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_source: Option<PathBuf>,
    /// Whether the component takes part in the next run
    #[serde(default = "default_true")]
    pub active: bool,
    /// Built-in component the host always loads first
    #[serde(default)]
    pub essential: bool,
    /// Position in the host's order (lower loads earlier)
    #[serde(default)]
    pub priority: usize,
}

fn default_true() -> bool {
    true
}

impl ComponentRef {
    /// Create an active, non-essential reference with no installation source
    #[must_use]
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            install_source: None,
            active: true,
            essential: false,
            priority: 0,
        }
    }

    /// With installation source
    #[inline]
    #[must_use]
    pub fn with_install_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.install_source = Some(source.into());
        self
    }

    /// With priority
    #[inline]
    #[must_use]
    pub fn with_priority(mut self, priority: usize) -> Self {
        self.priority = priority;
        self
    }

    /// Mark as essential
    #[inline]
    #[must_use]
    pub fn essential(mut self) -> Self {
        self.essential = true;
        self
    }

    /// Mark as inactive
    #[inline]
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Name with host decoration stripped, used for registry lookups
    #[must_use]
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Strip the host's built-in prefixes from a display name
#[must_use]
pub fn normalize_name(name: &str) -> String {
    BUILTIN_PREFIXES
        .iter()
        .fold(name.to_string(), |acc, prefix| acc.replace(prefix, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_builtin_prefixes() {
        assert_eq!(normalize_name("DLC: Dawnguard"), "Dawnguard");
        assert_eq!(
            normalize_name("Creation Club: ccbgssse001-fish"),
            "ccbgssse001-fish"
        );
        assert_eq!(normalize_name("SkyUI"), "SkyUI");
    }

    #[test]
    fn manifest_defaults() {
        let parsed: ComponentRef =
            serde_json::from_str(r#"{"name":"A","root":"/mods/A"}"#).unwrap();
        assert!(parsed.active);
        assert!(!parsed.essential);
        assert_eq!(parsed.priority, 0);
        assert!(parsed.install_source.is_none());
    }
}
