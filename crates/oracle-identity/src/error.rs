//! Error types for identity resolution
//!
//! Every variant is scoped to a single component: a batch never fails as a
//! whole because one member could not be identified.

use std::path::PathBuf;

/// Per-component resolution failure
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// No installation source, override, or essential file group was usable
    #[error("cannot resolve identity of '{name}': {reason}")]
    Unresolved { name: String, reason: String },

    /// More than one identity marker sits beside the component
    #[error("ambiguous identity for '{name}': {count} markers found")]
    Ambiguous { name: String, count: usize },

    /// Filesystem failure while hashing or scanning
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IdentityError {
    /// Create unresolved error for a component
    pub fn unresolved(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unresolved {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the component must be skipped rather than retried
    ///
    /// Ambiguity is never resolved by guessing; everything else may succeed
    /// on a later pass once the filesystem changes.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Ambiguous { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_display() {
        let err = IdentityError::unresolved("SkyUI", "no installation source");
        assert_eq!(
            err.to_string(),
            "cannot resolve identity of 'SkyUI': no installation source"
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn ambiguous_is_fatal() {
        let err = IdentityError::Ambiguous {
            name: "SkyUI".to_string(),
            count: 2,
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("2 markers"));
    }
}
