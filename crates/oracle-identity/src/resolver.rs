//! Identity resolution for host components
//!
//! [`IdentityResolver`] turns a [`ComponentRef`] into a [`ComponentId`]:
//!
//! 1. registry override for built-in names, consulted only for essential
//!    components or when no installation archive is on disk
//! 2. cached marker beside the component
//! 3. SHA-256 of the installation archive
//! 4. SHA-256 of the concatenated essential file group
//!
//! Fresh results are cached as markers. Batches above the parallel
//! threshold run on a bounded rayon pool; each component is resolved
//! independently and failures are collected, never propagated.

use crate::component::ComponentRef;
use crate::error::IdentityError;
use crate::essentials::EssentialRegistry;
use crate::id::ComponentId;
use crate::marker::{self, DEFAULT_MARKER_SUFFIX};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Batches larger than this are resolved in parallel
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 32;

/// Placeholder substituted with the current user in absolute source paths
const USER_PLACEHOLDER: &str = "USERNAME";

/// Resolver configuration
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Directory that bare installation file names are relative to
    pub downloads_dir: Option<PathBuf>,
    /// Marker file suffix
    pub marker_suffix: String,
    /// Batch size above which resolution runs in parallel
    pub parallel_threshold: usize,
    /// Worker cap for parallel resolution (0 = one per CPU)
    pub max_workers: usize,
    /// Built-in component registry
    pub registry: EssentialRegistry,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            downloads_dir: None,
            marker_suffix: DEFAULT_MARKER_SUFFIX.to_string(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            max_workers: 0,
            registry: EssentialRegistry::default(),
        }
    }
}

impl ResolverConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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

    /// With registry
    #[inline]
    #[must_use]
    pub fn with_registry(mut self, registry: EssentialRegistry) -> Self {
        self.registry = registry;
        self
    }
}

/// A component together with its resolved identifier
#[derive(Debug, Clone)]
pub struct ResolvedComponent {
    /// Host reference as it was at resolution time
    pub component: ComponentRef,
    /// Stable identifier
    pub id: ComponentId,
}

/// A component that could not be identified this round
#[derive(Debug)]
pub struct ResolutionFailure {
    /// Host display name
    pub name: String,
    /// Why resolution failed
    pub error: IdentityError,
}

/// Outcome of resolving a batch
///
/// Both lists preserve the input order.
#[derive(Debug, Default)]
pub struct ResolutionReport {
    /// Successfully identified components
    pub resolved: Vec<ResolvedComponent>,
    /// Components skipped this round
    pub failures: Vec<ResolutionFailure>,
}

impl ResolutionReport {
    /// True when every component was identified
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Identifier resolved for a display name
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ComponentId> {
        self.resolved
            .iter()
            .find(|r| r.component.name == name)
            .map(|r| r.id)
    }

    /// Emit one warning per skipped component
    pub fn log_failures(&self) {
        if self.failures.is_empty() {
            return;
        }
        tracing::warn!(count = self.failures.len(), "failed to find/process components");
        for failure in &self.failures {
            tracing::warn!(component = %failure.name, error = %failure.error, "skipped");
        }
    }
}

/// Resolves host components to stable identifiers
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    config: ResolverConfig,
}

impl IdentityResolver {
    /// Create resolver
    #[inline]
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve one component
    ///
    /// # Errors
    /// [`IdentityError::Ambiguous`] for multiple markers,
    /// [`IdentityError::Unresolved`] when nothing identifies the component,
    /// [`IdentityError::Io`] when a required file cannot be read.
    pub fn resolve(&self, component: &ComponentRef) -> Result<ComponentId, IdentityError> {
        let normalized = component.normalized_name();
        let archive = self.archive_path(component);
        if component.essential || archive.is_none() {
            if let Some(id) = self.config.registry.override_for(&normalized) {
                tracing::debug!(component = %component.name, id = %id.short(), "registry override");
                return Ok(id);
            }
        }

        let suffix = &self.config.marker_suffix;
        if let Some(id) = marker::read_marker(&component.name, &component.root, suffix)? {
            return Ok(id);
        }

        let id = match archive {
            Some(path) => hash_files(&[path])?,
            None => self.hash_essential_group(component, &normalized)?,
        };
        if let Err(e) = marker::write_marker(&component.root, &id, suffix) {
            tracing::warn!(component = %component.name, error = %e, "could not cache identity marker");
        }
        tracing::debug!(component = %component.name, id = %id.short(), "resolved");
        Ok(id)
    }

    /// Resolve a batch, isolating per-component failures
    #[must_use]
    pub fn resolve_all(&self, components: &[ComponentRef]) -> ResolutionReport {
        let outcomes: Vec<(&ComponentRef, Result<ComponentId, IdentityError>)> =
            if components.len() > self.config.parallel_threshold {
                self.resolve_parallel(components)
            } else {
                components.iter().map(|c| (c, self.resolve(c))).collect()
            };

        let mut report = ResolutionReport::default();
        for (component, outcome) in outcomes {
            match outcome {
                Ok(id) => report.resolved.push(ResolvedComponent {
                    component: component.clone(),
                    id,
                }),
                Err(error) => report.failures.push(ResolutionFailure {
                    name: component.name.clone(),
                    error,
                }),
            }
        }
        tracing::info!(
            resolved = report.resolved.len(),
            failed = report.failures.len(),
            "components resolved"
        );
        report
    }

    fn resolve_parallel<'a>(
        &self,
        components: &'a [ComponentRef],
    ) -> Vec<(&'a ComponentRef, Result<ComponentId, IdentityError>)> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .thread_name(|i| format!("oracle-resolve-{i}"))
            .build();

        match pool {
            Ok(pool) => {
                tracing::debug!(components = components.len(), workers = pool.current_num_threads(), "parallel resolution");
                pool.install(|| {
                    components
                        .par_iter()
                        .map(|c| (c, self.resolve(c)))
                        .collect()
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "worker pool unavailable, resolving sequentially");
                components.iter().map(|c| (c, self.resolve(c))).collect()
            }
        }
    }

    /// The installation archive, when it exists on disk
    fn archive_path(&self, component: &ComponentRef) -> Option<PathBuf> {
        component
            .install_source
            .as_ref()
            .map(|s| self.source_path(s))
            .filter(|p| p.is_file())
    }

    fn hash_essential_group(&self, component: &ComponentRef, normalized: &str) -> Result<ComponentId, IdentityError> {
        let files = self.config.registry.files_for(normalized, &component.root);
        if files.is_empty() {
            let reason = match &component.install_source {
                Some(source) => format!(
                    "installation source {} not found and no essential files present",
                    self.source_path(source).display()
                ),
                None => "no installation source and no essential files present".to_string(),
            };
            return Err(IdentityError::unresolved(&component.name, reason));
        }
        hash_files(&files)
    }

    /// Locate an installation archive on disk
    fn source_path(&self, source: &Path) -> PathBuf {
        let raw = source.to_string_lossy();
        let is_bare = !raw.contains('/') && !raw.contains(MAIN_SEPARATOR);

        if is_bare {
            return match &self.config.downloads_dir {
                Some(dir) => dir.join(source),
                None => source.to_path_buf(),
            };
        }

        if raw.contains(USER_PLACEHOLDER) {
            if let Some(user) = current_user() {
                return PathBuf::from(raw.replace(USER_PLACEHOLDER, &user));
            }
        }
        source.to_path_buf()
    }
}

fn current_user() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.is_empty())
}

/// SHA-256 over the concatenated contents of `files`, in order
fn hash_files(files: &[PathBuf]) -> Result<ComponentId, IdentityError> {
    let mut hasher = Sha256::new();
    for path in files {
        let mut file = File::open(path).map_err(|e| IdentityError::io_error(path, e))?;
        io::copy(&mut file, &mut hasher).map_err(|e| IdentityError::io_error(path, e))?;
    }
    Ok(ComponentId::new(hasher.finalize().into()))
}
