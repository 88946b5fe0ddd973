//! JSON manifest host
//!
//! A [`ManifestHost`] is a [`MemoryHost`] backed by a JSON file:
//!
//! ```json
//! { "components": [ { "name": "SkyUI", "root": "/mods/SkyUI", "priority": 3 } ] }
//! ```
//!
//! Saving writes a sibling temp file and renames it over the manifest.

use crate::error::HostError;
use crate::host::{ComponentHost, MemoryHost};
use oracle_identity::ComponentRef;
use std::fs;
use std::path::{Path, PathBuf};

/// Host whose component list lives in a JSON manifest
#[derive(Debug, Clone)]
pub struct ManifestHost {
    path: PathBuf,
    host: MemoryHost,
}

impl ManifestHost {
    /// Read a manifest
    ///
    /// # Errors
    /// [`HostError::Io`] or [`HostError::Json`]
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HostError> {
        let path = path.into();
        let text = fs::read_to_string(&path).map_err(|e| HostError::io_error(&path, e))?;
        let host: MemoryHost = serde_json::from_str(&text).map_err(|source| HostError::Json {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), components = host.names().len(), "manifest loaded");
        Ok(Self {
            path,
            host: MemoryHost::new(host.components()),
        })
    }

    /// Manifest path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Underlying in-memory host
    #[must_use]
    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    /// Write the manifest back
    ///
    /// # Errors
    /// [`HostError::Io`] or [`HostError::Json`]
    pub fn save(&self) -> Result<(), HostError> {
        let text = serde_json::to_string_pretty(&self.host).map_err(|source| HostError::Json {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text).map_err(|e| HostError::io_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| HostError::io_error(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), "manifest saved");
        Ok(())
    }
}

impl ComponentHost for ManifestHost {
    fn components(&self) -> Vec<ComponentRef> {
        self.host.components()
    }

    fn apply_priorities(&mut self, priorities: &[(String, usize)]) -> Result<(), HostError> {
        self.host.apply_priorities(priorities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "components": [
            { "name": "SkyUI", "root": "/mods/SkyUI", "install_source": "SkyUI_5_2.7z", "priority": 4 },
            { "name": "Skyrim", "root": "/game", "essential": true },
            { "name": "Old Patch", "root": "/mods/old", "active": false, "priority": 9 }
        ]
    }"#;

    #[test]
    fn open_applies_field_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, MANIFEST).unwrap();

        let host = ManifestHost::open(&path).unwrap();
        let skyrim = host.host().get("Skyrim").unwrap();
        assert!(skyrim.active && skyrim.essential);
        assert_eq!(skyrim.priority, 0);
        assert_eq!(host.host().names(), vec!["Skyrim", "SkyUI", "Old Patch"]);
    }

    #[test]
    fn save_persists_new_priorities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, MANIFEST).unwrap();

        let mut host = ManifestHost::open(&path).unwrap();
        host.apply_priorities(&[("SkyUI".into(), 10)]).unwrap();
        host.save().unwrap();

        let reopened = ManifestHost::open(&path).unwrap();
        assert_eq!(reopened.host().get("SkyUI").unwrap().priority, 10);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn malformed_manifest_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ManifestHost::open(&path), Err(HostError::Json { .. })));
    }
}
