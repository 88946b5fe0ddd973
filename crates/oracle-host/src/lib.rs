//! Oracle Host
//!
//! Connects a host application's component collection to the precedence
//! learner.
//!
//! # Architecture
//!
//! - [`ComponentHost`]: live component list, activation, priorities
//! - [`OracleSession`]: event hooks, sampling, audit, persistence
//! - [`GraphView`]: read-only view for visualization
//! - [`OracleConfig`]: TOML configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use oracle_host::{MemoryHost, OracleConfig, OracleSession};
//! use oracle_identity::ComponentRef;
//!
//! let mut host = MemoryHost::new(vec![
//!     ComponentRef::new("SkyUI", "/mods/SkyUI").with_install_source("SkyUI_5_2.7z"),
//! ]);
//! let mut session = OracleSession::open(OracleConfig::new().with_downloads_dir("/downloads"));
//!
//! session.on_run_start(&host);
//! session.on_run_finished(&host, "skse64_loader.exe", 0, true)?;
//! let (_order, _strategy) = session.sample_or_shuffle(&mut host)?;
//! session.save()?;
//! # Ok::<(), oracle_host::SessionError>(())
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod manifest;
pub mod session;
pub mod view;

// Re-exports
pub use config::{OracleConfig, DEFAULT_STORE_FILE};
pub use error::{ConfigError, HostError, SessionError};
pub use host::{ComponentHost, MemoryHost};
pub use manifest::ManifestHost;
pub use session::{environment_name, AuditFinding, OracleSession, Strategy};
pub use view::{GraphEdge, GraphNode, GraphSnapshot, GraphView};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
