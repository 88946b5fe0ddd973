//! Oracle session
//!
//! Wires host events to the learner. A session owns the knowledge base for
//! its lifetime; the host is only borrowed for the duration of each event.
//!
//! | Event                | Effect                                          |
//! |----------------------|-------------------------------------------------|
//! | [`on_install`]       | identify one component and admit it             |
//! | [`on_run_start`]     | identify every active component                 |
//! | [`on_run_finished`]  | record the run that just ended                  |
//!
//! [`on_install`]: OracleSession::on_install
//! [`on_run_start`]: OracleSession::on_run_start
//! [`on_run_finished`]: OracleSession::on_run_finished

use crate::config::OracleConfig;
use crate::error::SessionError;
use crate::host::ComponentHost;
use crate::view::GraphView;
use oracle_core::{
    audit, derive, random_order, record, store, FlaggedPair, KnowledgeBase, Outcome, RecordSummary, Trial,
};
use oracle_identity::{ComponentId, ComponentRef, IdentityResolver, ResolutionReport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// How [`OracleSession::sample`] produces an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Randomized topological sort over pending requirements
    #[default]
    Derived,
    /// Uniformly random permutation, to gather evidence
    Random,
}

/// A flagged pair annotated with display names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditFinding {
    /// Flagged identifiers
    pub pair: FlaggedPair,
    /// Name of the component placed first
    pub earlier: String,
    /// Name of the component placed after it
    pub later: String,
}

/// Environment name of an executable path: its basename without `.exe`
#[must_use]
pub fn environment_name(executable: &str) -> String {
    let base = executable
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(executable);
    base.strip_suffix(".exe").unwrap_or(base).to_string()
}

/// Learner state bound to one configuration
#[derive(Debug)]
pub struct OracleSession {
    config: OracleConfig,
    resolver: IdentityResolver,
    kb: KnowledgeBase,
    ids: BTreeMap<String, ComponentId>,
    last_proposed: Option<Vec<ComponentId>>,
    rng: StdRng,
}

impl OracleSession {
    /// Open a session, restoring the knowledge base from the configured store
    ///
    /// An unusable store is logged and replaced by an empty knowledge base.
    #[must_use]
    pub fn open(config: OracleConfig) -> Self {
        let kb = store::restore(&config.store_path());
        Self::with_knowledge(config, kb)
    }

    /// Session over an existing knowledge base
    #[must_use]
    pub fn with_knowledge(config: OracleConfig, kb: KnowledgeBase) -> Self {
        Self {
            resolver: IdentityResolver::new(config.resolver_config()),
            config,
            kb,
            ids: BTreeMap::new(),
            last_proposed: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// With a fixed sampling seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Read-only knowledge base
    #[inline]
    #[must_use]
    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Identifier last resolved for a host name
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ComponentId> {
        self.ids.get(name).copied()
    }

    /// Persist the knowledge base to the configured store
    ///
    /// # Errors
    /// [`SessionError::Store`]
    pub fn save(&self) -> Result<(), SessionError> {
        store::persist(&self.kb, &self.config.store_path())?;
        Ok(())
    }

    /// Identify every active host component and admit it
    ///
    /// Components that cannot be identified are skipped and reported.
    pub fn resolve<H: ComponentHost + ?Sized>(&mut self, host: &H) -> ResolutionReport {
        let active: Vec<ComponentRef> = host.components().into_iter().filter(|c| c.active).collect();
        let report = self.resolver.resolve_all(&active);

        self.ids.clear();
        for resolved in &report.resolved {
            self.admit(&resolved.component, resolved.id);
        }
        report.log_failures();
        tracing::info!(
            resolved = report.resolved.len(),
            failed = report.failures.len(),
            known = self.kb.len(),
            "components resolved"
        );
        report
    }

    /// A component was installed
    ///
    /// # Errors
    /// [`SessionError::Identity`] if the component cannot be identified
    pub fn on_install(&mut self, component: &ComponentRef) -> Result<ComponentId, SessionError> {
        let id = self.resolver.resolve(component)?;
        self.admit(component, id);
        tracing::info!(component = %component.name, id = %id.short(), "component installed");
        Ok(id)
    }

    /// A run is about to start
    pub fn on_run_start<H: ComponentHost + ?Sized>(&mut self, host: &H) -> ResolutionReport {
        self.resolve(host)
    }

    /// A run finished
    ///
    /// The run passed iff `exit_code` is 0 and the user `confirmed` it.
    /// Returns `None` when the environment is not tracked. A session that
    /// has not resolved the host yet resolves it first.
    ///
    /// # Errors
    /// [`SessionError::Knowledge`] if the order references an identifier
    /// the knowledge base lost.
    pub fn on_run_finished<H: ComponentHost + ?Sized>(
        &mut self,
        host: &H,
        executable: &str,
        exit_code: i32,
        confirmed: bool,
    ) -> Result<Option<RecordSummary>, SessionError> {
        let environment = environment_name(executable);
        tracing::info!(environment = %environment, exit_code, "run finished");
        if !self.config.tracks(&environment) {
            tracing::debug!(environment = %environment, "environment not tracked");
            return Ok(None);
        }

        let outcome = Outcome::from(exit_code == 0 && confirmed);
        let env_id = ComponentId::for_environment(&environment);
        self.kb.admit(env_id, &environment);

        if self.ids.is_empty() {
            self.resolve(host);
        }
        let order = self.current_order(host);
        let active = host.active_in_order().len();
        if order.len() < active {
            tracing::warn!(
                recorded = order.len(),
                active,
                "unidentified components left out of the trial"
            );
        }
        for id in &order {
            tracing::debug!(component = %self.kb.display_name(id), id = %id.short(), "active");
        }
        let summary = record(&mut self.kb, &Trial::new(env_id, order), outcome)?;
        Ok(Some(summary))
    }

    /// Identifiers of the host's active components in priority order
    ///
    /// Components not resolved by the last [`resolve`](Self::resolve) are
    /// left out.
    pub fn current_order<H: ComponentHost + ?Sized>(&self, host: &H) -> Vec<ComponentId> {
        host.active_in_order()
            .iter()
            .filter_map(|c| {
                let id = self.ids.get(&c.name).copied();
                if id.is_none() {
                    tracing::debug!(component = %c.name, "unresolved, left out of order");
                }
                id
            })
            .collect()
    }

    /// Produce an order for the active non-essential components and apply it
    ///
    /// Essential components keep the lowest priorities; the new order starts
    /// right after them.
    ///
    /// # Errors
    /// [`SessionError::Derive`] when [`Strategy::Derived`] finds no
    /// consistent order, [`SessionError::Host`] if the host rejects the
    /// priorities.
    pub fn sample<H: ComponentHost + ?Sized>(
        &mut self,
        host: &mut H,
        strategy: Strategy,
    ) -> Result<Vec<ComponentId>, SessionError> {
        let components = host.components();
        let offset = components.iter().filter(|c| c.essential).count();

        let mut names: BTreeMap<ComponentId, &str> = BTreeMap::new();
        for component in components.iter().filter(|c| c.active && !c.essential) {
            match self.ids.get(&component.name) {
                Some(id) => {
                    names.entry(*id).or_insert(component.name.as_str());
                }
                None => tracing::debug!(component = %component.name, "unresolved, not reordered"),
            }
        }
        let active: BTreeSet<ComponentId> = names.keys().copied().collect();

        let order = match strategy {
            Strategy::Derived => derive(&self.kb, &active, &mut self.rng)?,
            Strategy::Random => random_order(&active, &mut self.rng),
        };

        let priorities: Vec<(String, usize)> = order
            .iter()
            .enumerate()
            .filter_map(|(i, id)| names.get(id).map(|name| ((*name).to_string(), i + offset)))
            .collect();
        host.apply_priorities(&priorities)?;

        tracing::info!(components = order.len(), essential = offset, strategy = ?strategy, "order applied");
        self.last_proposed = Some(order.clone());
        Ok(order)
    }

    /// [`sample`](Self::sample) a derived order, falling back to a random one
    /// while evidence is insufficient
    ///
    /// # Errors
    /// Any [`sample`](Self::sample) error other than insufficient evidence.
    pub fn sample_or_shuffle<H: ComponentHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<(Vec<ComponentId>, Strategy), SessionError> {
        match self.sample(host, Strategy::Derived) {
            Err(e) if e.needs_more_evidence() => {
                tracing::warn!(error = %e, "falling back to a random order");
                self.sample(host, Strategy::Random).map(|order| (order, Strategy::Random))
            }
            other => other.map(|order| (order, Strategy::Derived)),
        }
    }

    /// Audit the host's current order
    ///
    /// # Errors
    /// [`SessionError::Knowledge`] if a resolved identifier has no record
    pub fn audit_active<H: ComponentHost + ?Sized>(&self, host: &H) -> Result<Vec<AuditFinding>, SessionError> {
        let order = self.current_order(host);
        let findings = audit(&self.kb, &order)?
            .into_iter()
            .map(|pair| AuditFinding {
                earlier: self.kb.display_name(&pair.earlier),
                later: self.kb.display_name(&pair.later),
                pair,
            })
            .collect();
        Ok(findings)
    }

    /// Known components whose name starts with `prefix`, ignoring case
    #[must_use]
    pub fn find(&self, prefix: &str) -> Vec<(String, ComponentId)> {
        self.kb
            .find_by_prefix(prefix)
            .into_iter()
            .map(|r| (r.display_name.clone(), r.id()))
            .collect()
    }

    /// Read-only view for visualization
    #[must_use]
    pub fn graph_view(&self) -> GraphView<'_> {
        GraphView::new(&self.kb, self.last_proposed.as_deref())
    }

    fn admit(&mut self, component: &ComponentRef, id: ComponentId) {
        self.kb.admit(id, &component.name);
        self.ids.insert(component.name.clone(), id);
    }
}
