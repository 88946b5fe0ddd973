//! Oracle Identity
//!
//! Stable, content-derived identity for components that users rename and
//! relocate freely.
//!
//! # Core Concepts
//!
//! - [`ComponentId`]: 32-byte SHA-256 identifier
//! - [`ComponentRef`]: what the host knows about one component
//! - [`IdentityResolver`]: reference → identifier, cached as a marker file
//! - [`EssentialRegistry`]: file groups and fixed identifiers for built-ins
//!
//! # Example
//!
//! ```rust,no_run
//! use oracle_identity::{ComponentRef, IdentityResolver, ResolverConfig};
//!
//! let resolver = IdentityResolver::new(ResolverConfig::new().with_downloads_dir("/downloads"));
//! let component = ComponentRef::new("SkyUI", "/mods/SkyUI").with_install_source("SkyUI_5_2.7z");
//!
//! let report = resolver.resolve_all(&[component]);
//! report.log_failures();
//! ```

#![warn(unreachable_pub)]

mod component;
mod error;
mod essentials;
mod id;
pub mod marker;
mod resolver;

// Re-exports
pub use component::{normalize_name, ComponentRef};
pub use error::IdentityError;
pub use essentials::{EssentialRegistry, DEFAULT_PROBE_EXTENSIONS};
pub use id::{ComponentId, IdError, ID_LEN};
pub use marker::DEFAULT_MARKER_SUFFIX;
pub use resolver::{
    IdentityResolver, ResolutionFailure, ResolutionReport, ResolvedComponent, ResolverConfig,
    DEFAULT_PARALLEL_THRESHOLD,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
