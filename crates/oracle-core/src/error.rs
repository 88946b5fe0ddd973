//! Error types for the precedence learner
//!
//! Provides error handling for:
//! - Lookups against identifiers the knowledge base has never seen
//! - Derivation when evidence admits no total order
//! - Persisted store I/O and corruption
//! - Store images whose records and relations disagree

use crate::relation::Polarity;
use oracle_identity::ComponentId;
use std::path::PathBuf;

/// Knowledge base lookup errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KnowledgeError {
    /// Identifier was never admitted to the knowledge base
    #[error("unknown component {0}")]
    NotFound(ComponentId),
}

/// Order derivation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeriveError {
    /// Pending requirements still form a cycle among the active components
    #[error("no consistent order: placed {placed} of {total} components before a cycle")]
    NoConsistentOrder { placed: usize, total: usize },

    /// Active set references an unknown identifier
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
}

impl DeriveError {
    /// True when more trials would let derivation succeed
    #[inline]
    #[must_use]
    pub fn needs_more_evidence(&self) -> bool {
        matches!(self, Self::NoConsistentOrder { .. })
    }
}

/// Inconsistencies in a decoded knowledge base image
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    /// Two records share one identifier
    #[error("duplicate component records")]
    DuplicateRecords,

    /// Relation keys differ from the set of records
    #[error("{polarity}: relation keys do not match component records")]
    KeyMismatch { polarity: Polarity },

    /// A relation set contains its own key
    #[error("{polarity}: {} relates to itself", .id.short())]
    SelfRelation { polarity: Polarity, id: ComponentId },

    /// A relation set names an identifier with no record
    #[error("{polarity}: {} relates to unknown {}", .key.short(), .member.short())]
    UnknownMember {
        polarity: Polarity,
        key: ComponentId,
        member: ComponentId,
    },
}

/// Persisted store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure reading or writing the store
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store exists but does not decode into a consistent knowledge base
    #[error("corrupt store at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Store decodes but its records and relations disagree
    #[error("inconsistent store at {path}: {source}")]
    Inconsistent {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    /// Encoding the knowledge base failed
    #[error("encode error: {0}")]
    Encode(#[from] bincode::Error),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create corruption error for path
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
