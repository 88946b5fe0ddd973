//! Built-in component registry
//!
//! Built-in components have no installation archive, so their identity is
//! derived from a fixed group of files named after the component. A few of
//! them drift between host updates without changing meaning; those carry a
//! pre-computed identifier that is returned without reading anything.

use crate::id::ComponentId;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Extensions probed when a component has no registered file group
pub const DEFAULT_PROBE_EXTENSIONS: [&str; 4] = ["bsa", "esl", "esm", "esp"];

const BUILTIN_FILE_GROUPS: [(&str, &[&str]); 8] = [
    ("Dawnguard", &["esm"]),
    ("Dragonborn", &["esm"]),
    ("HearthFires", &["esm"]),
    ("ccbgssse001-fish", &["bsa", "esm"]),
    ("ccbgssse025-advdsgs", &["bsa", "esm"]),
    ("ccqdrsse001-survivalmode", &["bsa", "esl"]),
    ("ccbgssse037-curios", &["bsa", "esl"]),
    ("_ResourcePack", &["bsa", "esl"]),
];

const BUILTIN_OVERRIDES: [(&str, &str); 8] = [
    ("Dawnguard", "1bda804009a21228acf6b30aa6aa7a692b247ff8a0313fe9aa69b3617ed4a6c4"),
    ("Dragonborn", "5f44f343552688c04f73bf83de58b90f70c7376b133fbbcb56b6fe33acf8778b"),
    ("HearthFires", "ad4ca9f32c81e7ddd3e39ec95e03b07841f20712989e598778442ea69b6e6a97"),
    ("ccbgssse001-fish", "3b7693a876cd6001960e3f5e3069a79ac8c8fc5528113908bab5079b31efbb87"),
    ("ccbgssse025-advdsgs", "d4fe42062c317d2f2d1b3d590fb9afcba850efb69d3e34c86fa64442cda38781"),
    ("ccqdrsse001-survivalmode", "67393c051f40317be8fa5f36019d92c081ae0aae717441b866bcc2dbbce77650"),
    ("ccbgssse037-curios", "7847bc8bc8b22e66fb36647a1f0e454e2e5fe68db0e1385c0c58fff04839dffa"),
    ("_ResourcePack", "987f002b2b85ceed0309cb120c0576b359d4ace89f1e4332ecaf1775a3e8725d"),
];

/// Name-keyed file groups and identifier overrides for built-in components
#[derive(Debug, Clone)]
pub struct EssentialRegistry {
    file_groups: HashMap<String, Vec<String>>,
    overrides: HashMap<String, ComponentId>,
    probe_extensions: Vec<String>,
}

impl Default for EssentialRegistry {
    /// Registry preloaded with the base-game master files
    fn default() -> Self {
        let mut registry = Self::empty();
        for (name, extensions) in BUILTIN_FILE_GROUPS {
            registry = registry.with_file_group(name, extensions.iter().copied());
        }
        for (name, hex) in BUILTIN_OVERRIDES {
            if let Ok(id) = hex.parse() {
                registry = registry.with_override(name, id);
            }
        }
        registry
    }
}

impl EssentialRegistry {
    /// Registry with no file groups or overrides, probing the default extensions
    #[must_use]
    pub fn empty() -> Self {
        Self {
            file_groups: HashMap::new(),
            overrides: HashMap::new(),
            probe_extensions: DEFAULT_PROBE_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
        }
    }

    /// Register the expected file extensions for a component name
    #[must_use]
    pub fn with_file_group<I, S>(mut self, name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_groups
            .insert(name.into(), extensions.into_iter().map(Into::into).collect());
        self
    }

    /// Register a pre-computed identifier for a component name
    #[must_use]
    pub fn with_override(mut self, name: impl Into<String>, id: ComponentId) -> Self {
        self.overrides.insert(name.into(), id);
        self
    }

    /// Replace the extensions probed for unregistered names
    #[must_use]
    pub fn with_probe_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.probe_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Pre-computed identifier for a normalized name
    #[inline]
    #[must_use]
    pub fn override_for(&self, normalized_name: &str) -> Option<ComponentId> {
        self.overrides.get(normalized_name).copied()
    }

    /// Files that make up the component's identity, in hashing order
    ///
    /// Registered groups are returned as-is (a missing member surfaces as a
    /// read error later). Unregistered names yield only the probe files that
    /// actually exist.
    #[must_use]
    pub fn files_for(&self, normalized_name: &str, root: &Path) -> Vec<PathBuf> {
        let path_for = |ext: &str| root.join(format!("{normalized_name}.{ext}"));

        if let Some(group) = self.file_groups.get(normalized_name) {
            return group.iter().map(|ext| path_for(ext)).collect();
        }

        let found: Vec<PathBuf> = self
            .probe_extensions
            .iter()
            .map(|ext| path_for(ext))
            .filter(|p| p.is_file())
            .collect();
        tracing::debug!(component = normalized_name, files = found.len(), "probed essential files");
        found
    }
}
