//! Oracle Core
//!
//! Learns which relative orderings of components are safe from whole-run
//! pass/fail signals, and derives new orders consistent with that evidence.
//!
//! # Pipeline
//!
//! 1. **Knowledge base**: [`KnowledgeBase::get_or_create`] seeds a new
//!    identifier as fully ambiguous against every known one
//! 2. **Observation**: [`record`] retires the directions a trial exercised
//! 3. **Derivation**: [`derive`] runs a randomized topological sort over the
//!    pending-success graph
//! 4. **Audit**: [`audit`] flags pairs that contradict confirmed evidence
//!
//! # Quick Start
//!
//! ```rust
//! use oracle_core::{audit, derive, record, FlaggedPair, KnowledgeBase, Outcome, Trial};
//! use oracle_identity::ComponentId;
//! use rand::SeedableRng;
//! use std::collections::BTreeSet;
//!
//! let env = ComponentId::for_environment("game");
//! let a = ComponentId::compute(b"a");
//! let b = ComponentId::compute(b"b");
//!
//! let mut kb = KnowledgeBase::new();
//! for id in [env, a, b] {
//!     kb.get_or_create(id);
//! }
//!
//! record(&mut kb, &Trial::new(env, vec![a, b]), Outcome::Pass)?;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! assert_eq!(derive(&kb, &BTreeSet::from([a, b]), &mut rng)?, vec![a, b]);
//! assert_eq!(audit(&kb, &[b, a])?, vec![FlaggedPair::new(b, a)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unreachable_pub)]

pub mod audit;
pub mod derive;
pub mod error;
pub mod knowledge;
pub mod observe;
pub mod relation;
pub mod store;
pub mod trial;

// Re-exports
pub use audit::{audit, FlaggedPair};
pub use derive::{derive, derive_with_thread_rng, random_order};
pub use error::{DeriveError, ImageError, KnowledgeError, StoreError};
pub use knowledge::{ComponentRecord, KnowledgeBase};
pub use observe::{record, RecordSummary};
pub use relation::{Polarity, RelationGraph};
pub use trial::{Outcome, Trial};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for learning and ordering
    pub use crate::{
        audit, derive, record, ComponentRecord, DeriveError, FlaggedPair, KnowledgeBase,
        KnowledgeError, Outcome, Polarity, Trial,
    };
    pub use oracle_identity::ComponentId;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
