//! Error types for the host session
//!
//! Provides error handling for:
//! - Configuration loading
//! - Host manifests and priority updates
//! - Everything the core crates can report during a session

use oracle_core::{DeriveError, KnowledgeError, StoreError};
use oracle_identity::IdentityError;
use std::path::PathBuf;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`OracleConfig`](crate::OracleConfig)
    #[error("invalid config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Host-side errors
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Manifest could not be read or written
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid JSON
    #[error("invalid manifest at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Priority update names a component the host does not have
    #[error("unknown component '{0}'")]
    UnknownComponent(String),
}

impl HostError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Session errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Configuration error
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Host error
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// Component could not be identified
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Knowledge base lookup failed
    #[error("knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    /// No order could be derived
    #[error("derive error: {0}")]
    Derive(#[from] DeriveError),

    /// Knowledge base could not be persisted
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    /// True when recording more trials would clear the error
    #[inline]
    #[must_use]
    pub fn needs_more_evidence(&self) -> bool {
        matches!(self, Self::Derive(e) if e.needs_more_evidence())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_identity::ComponentId;

    #[test]
    fn derive_cycle_needs_more_evidence() {
        let err = SessionError::from(DeriveError::NoConsistentOrder { placed: 1, total: 3 });
        assert!(err.needs_more_evidence());
        assert!(err.to_string().contains("placed 1 of 3"));
    }

    #[test]
    fn unknown_identifier_does_not_need_more_evidence() {
        let missing = KnowledgeError::NotFound(ComponentId::new([9; 32]));
        assert!(!SessionError::from(DeriveError::from(missing.clone())).needs_more_evidence());
        assert!(!SessionError::from(missing).needs_more_evidence());
    }

    #[test]
    fn host_error_names_the_component() {
        let err = SessionError::from(HostError::UnknownComponent("SkyUI".into()));
        assert_eq!(err.to_string(), "host error: unknown component 'SkyUI'");
    }
}
