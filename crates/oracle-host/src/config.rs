//! Session configuration
//!
//! Loaded from TOML; every field is optional and falls back to
//! [`OracleConfig::default`].
//!
//! ```toml
//! data_dir = "/var/lib/oracle"
//! downloads_dir = "/home/USERNAME/downloads"
//! tracked_environments = ["skse64_loader"]
//! log_level = "debug"
//! ```

use crate::error::ConfigError;
use oracle_identity::{ResolverConfig, DEFAULT_MARKER_SUFFIX, DEFAULT_PARALLEL_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default store file name inside the data directory
pub const DEFAULT_STORE_FILE: &str = "knowledge.bin";

/// Oracle session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Directory holding the persisted knowledge base
    pub data_dir: PathBuf,
    /// Store file name inside `data_dir`
    pub store_file: String,
    /// Directory bare installation sources are relative to
    pub downloads_dir: Option<PathBuf>,
    /// Identity marker suffix
    pub marker_suffix: String,
    /// Batch size above which resolution runs in parallel
    pub parallel_threshold: usize,
    /// Worker cap for parallel resolution (0 = one per CPU)
    pub max_workers: usize,
    /// Environments whose runs are recorded (empty = all)
    pub tracked_environments: Vec<String>,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("oracle-data"),
            store_file: DEFAULT_STORE_FILE.to_string(),
            downloads_dir: None,
            marker_suffix: DEFAULT_MARKER_SUFFIX.to_string(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            max_workers: 0,
            tracked_environments: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl OracleConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`]; `origin` only labels the message.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] or [`ConfigError::Parse`]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// With data directory
    #[inline]
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// With store file name
    #[inline]
    #[must_use]
    pub fn with_store_file(mut self, name: impl Into<String>) -> Self {
        self.store_file = name.into();
        self
    }

    /// With downloads directory
    #[inline]
    #[must_use]
    pub fn with_downloads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.downloads_dir = Some(dir.into());
        self
    }

    /// With marker suffix
    #[inline]
    #[must_use]
    pub fn with_marker_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.marker_suffix = suffix.into();
        self
    }

    /// With parallel threshold
    #[inline]
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// With worker cap
    #[inline]
    #[must_use]
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    /// With tracked environment added
    #[inline]
    #[must_use]
    pub fn with_tracked_environment(mut self, name: impl Into<String>) -> Self {
        self.tracked_environments.push(name.into());
        self
    }

    /// With log level
    #[inline]
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Full path of the store file
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.store_file)
    }

    /// Whether runs in `environment` are recorded
    #[must_use]
    pub fn tracks(&self, environment: &str) -> bool {
        self.tracked_environments.is_empty()
            || self.tracked_environments.iter().any(|e| e == environment)
    }

    /// Resolver settings derived from this configuration
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        let mut config = ResolverConfig::new()
            .with_marker_suffix(&self.marker_suffix)
            .with_parallel_threshold(self.parallel_threshold)
            .with_max_workers(self.max_workers);
        if let Some(dir) = &self.downloads_dir {
            config = config.with_downloads_dir(dir);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = OracleConfig::from_toml_str("", Path::new("oracle.toml")).unwrap();
        assert_eq!(config, OracleConfig::default());
        assert_eq!(config.parallel_threshold, 32);
    }

    #[test]
    fn partial_toml_overrides_named_fields() {
        let text = r#"
            data_dir = "/srv/oracle"
            tracked_environments = ["skse64_loader"]
            max_workers = 4
        "#;
        let config = OracleConfig::from_toml_str(text, Path::new("oracle.toml")).unwrap();

        assert_eq!(config.store_path(), Path::new("/srv/oracle/knowledge.bin"));
        assert_eq!(config.max_workers, 4);
        assert!(config.tracks("skse64_loader"));
        assert!(!config.tracks("SkyrimSE"));
        assert_eq!(config.marker_suffix, DEFAULT_MARKER_SUFFIX);
    }

    #[test]
    fn empty_tracked_list_tracks_everything() {
        assert!(OracleConfig::default().tracks("anything"));
    }

    #[test]
    fn invalid_toml_reports_path() {
        let err = OracleConfig::from_toml_str("max_workers = \"many\"", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oracle.toml");
        fs::write(&path, "store_file = \"kb.bin\"\nlog_level = \"debug\"\n").unwrap();

        let config = OracleConfig::load(&path).unwrap();
        assert_eq!(config.store_file, "kb.bin");
        assert_eq!(config.log_level, "debug");
        assert!(matches!(
            OracleConfig::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn resolver_config_carries_settings() {
        let config = OracleConfig::new()
            .with_downloads_dir("/downloads")
            .with_marker_suffix(".id")
            .with_parallel_threshold(8);
        let resolver = config.resolver_config();

        assert_eq!(resolver.downloads_dir.as_deref(), Some(Path::new("/downloads")));
        assert_eq!(resolver.marker_suffix, ".id");
        assert_eq!(resolver.parallel_threshold, 8);
    }
}
