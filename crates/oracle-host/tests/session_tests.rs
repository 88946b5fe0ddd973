//! Session Tests
//!
//! Host events driven end to end against on-disk component fixtures.

use oracle_core::Polarity;
use oracle_host::{ComponentHost, ManifestHost, MemoryHost, OracleConfig, OracleSession, Strategy};
use oracle_identity::ComponentId;
use oracle_test_utils::ComponentTree;
use pretty_assertions::assert_eq;
use std::fs;

struct Setup {
    tree: ComponentTree,
    host: MemoryHost,
}

impl Setup {
    /// One essential component followed by three installed ones
    fn new() -> Self {
        let tree = ComponentTree::new();
        let host = MemoryHost::new(vec![
            tree.essential("Skyrim", b"base game master", 0),
            tree.installed("Alpha", b"alpha archive", 1),
            tree.installed("Beta", b"beta archive", 2),
            tree.installed("Gamma", b"gamma archive", 3),
        ]);
        Self { tree, host }
    }

    fn config(&self) -> OracleConfig {
        OracleConfig::new()
            .with_data_dir(self.tree.data_dir())
            .with_downloads_dir(self.tree.downloads())
    }

    fn session(&self) -> OracleSession {
        OracleSession::open(self.config()).with_seed(7)
    }
}

fn ids(session: &OracleSession, names: &[&str]) -> Vec<ComponentId> {
    names.iter().map(|n| session.id_of(n).unwrap()).collect()
}

#[test]
fn run_start_admits_every_active_component() {
    let setup = Setup::new();
    let mut session = setup.session();

    let report = session.on_run_start(&setup.host);

    assert!(report.is_complete());
    assert_eq!(report.resolved.len(), 4);
    assert_eq!(session.knowledge().len(), 4);
}

#[test]
fn passing_run_makes_its_order_derivable() {
    let mut setup = Setup::new();
    let mut session = setup.session();
    session.on_run_start(&setup.host);

    let summary = session
        .on_run_finished(&setup.host, "/games/skse64_loader.exe", 0, true)
        .unwrap()
        .unwrap();
    assert_eq!(summary.positions, 5);

    let order = session.sample(&mut setup.host, Strategy::Derived).unwrap();
    assert_eq!(order, ids(&session, &["Alpha", "Beta", "Gamma"]));
    assert_eq!(setup.host.names(), vec!["Skyrim", "Alpha", "Beta", "Gamma"]);
    assert_eq!(setup.host.get("Alpha").unwrap().priority, 1);
    assert!(session.audit_active(&setup.host).unwrap().is_empty());
}

#[test]
fn run_finished_without_run_start_still_records_components() {
    let mut setup = Setup::new();
    let mut session = setup.session();

    let summary = session
        .on_run_finished(&setup.host, "skse64_loader.exe", 0, true)
        .unwrap()
        .unwrap();

    assert_eq!(summary.positions, 5);
    assert_eq!(session.knowledge().len(), 5);
    let order = session.sample(&mut setup.host, Strategy::Derived).unwrap();
    assert_eq!(order, ids(&session, &["Alpha", "Beta", "Gamma"]));
}

#[test]
fn environment_is_recorded_as_its_own_component() {
    let setup = Setup::new();
    let mut session = setup.session();
    session.on_run_start(&setup.host);
    session.on_run_finished(&setup.host, "skse64_loader.exe", 0, true).unwrap();

    let env = ComponentId::for_environment("skse64_loader");
    assert_eq!(session.knowledge().display_name(&env), "skse64_loader");
    assert_eq!(session.knowledge().len(), 5);
}

#[test]
fn failed_or_rejected_runs_only_touch_pending_failure() {
    let setup = Setup::new();
    let mut session = setup.session();
    session.on_run_start(&setup.host);
    session.on_run_finished(&setup.host, "skse64_loader.exe", 0, true).unwrap();
    let success_before = session.knowledge().graph(Polarity::Success).clone();

    session.on_run_finished(&setup.host, "skse64_loader.exe", 3, true).unwrap();
    session.on_run_finished(&setup.host, "skse64_loader.exe", 0, false).unwrap();

    assert_eq!(session.knowledge().graph(Polarity::Success), &success_before);
    let [alpha, beta] = [session.id_of("Alpha").unwrap(), session.id_of("Beta").unwrap()];
    assert!(!session
        .knowledge()
        .relation_set(&beta, Polarity::Failure)
        .unwrap()
        .contains(&alpha));
}

#[test]
fn untracked_environment_records_nothing() {
    let setup = Setup::new();
    let config = setup.config().with_tracked_environment("skse64_loader");
    let mut session = OracleSession::open(config);
    session.on_run_start(&setup.host);
    let before = session.knowledge().clone();

    let outcome = session.on_run_finished(&setup.host, "SkyrimSE.exe", 0, true).unwrap();

    assert!(outcome.is_none());
    assert_eq!(session.knowledge(), &before);
}

#[test]
fn reversed_order_is_audited_with_names() {
    let mut setup = Setup::new();
    let mut session = setup.session();
    session.on_run_start(&setup.host);
    session.on_run_finished(&setup.host, "skse64_loader.exe", 0, true).unwrap();

    setup
        .host
        .apply_priorities(&[("Gamma".into(), 1), ("Alpha".into(), 3)])
        .unwrap();
    let findings = session.audit_active(&setup.host).unwrap();

    let pairs: Vec<_> = findings.iter().map(|f| (f.earlier.as_str(), f.later.as_str())).collect();
    assert_eq!(pairs, vec![("Gamma", "Beta"), ("Gamma", "Alpha"), ("Beta", "Alpha")]);
}

#[test]
fn fresh_knowledge_falls_back_to_random_order() {
    let mut setup = Setup::new();
    let mut session = setup.session();
    session.on_run_start(&setup.host);

    let err = session.sample(&mut setup.host, Strategy::Derived).unwrap_err();
    assert!(err.needs_more_evidence());

    let (order, strategy) = session.sample_or_shuffle(&mut setup.host).unwrap();
    assert_eq!(strategy, Strategy::Random);
    assert_eq!(order.len(), 3);
    assert_eq!(setup.host.names()[0], "Skyrim");
    assert_eq!(session.graph_view().last_proposed(), Some(order.as_slice()));
}

#[test]
fn rename_keeps_identity_and_updates_display_name() {
    let mut setup = Setup::new();
    let mut session = setup.session();
    session.on_run_start(&setup.host);
    let alpha = session.id_of("Alpha").unwrap();

    let mut renamed = setup.host.get("Alpha").unwrap().clone();
    renamed.name = "Alpha Renamed".into();
    let mut components = setup.host.components();
    components.retain(|c| c.name != "Alpha");
    components.push(renamed);
    setup.host = MemoryHost::new(components);
    session.on_run_start(&setup.host);

    assert_eq!(session.id_of("Alpha Renamed"), Some(alpha));
    assert_eq!(session.knowledge().display_name(&alpha), "Alpha Renamed");
    assert_eq!(session.knowledge().len(), 4);
}

#[test]
fn unidentifiable_component_is_skipped() {
    let mut setup = Setup::new();
    setup.host.push(setup.tree.broken("Mystery", 4));
    let mut session = setup.session();

    let report = session.on_run_start(&setup.host);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "Mystery");
    assert_eq!(session.current_order(&setup.host).len(), 4);
}

#[test]
fn installed_component_is_admitted_and_findable() {
    let setup = Setup::new();
    let mut session = setup.session();
    let delta = setup.tree.installed("Delta Patch", b"delta archive", 5);

    let id = session.on_install(&delta).unwrap();

    assert!(session.knowledge().contains(&id));
    assert_eq!(session.find("delta"), vec![("Delta Patch".to_string(), id)]);
    assert!(session.find("zzz").is_empty());
}

#[test]
fn saved_knowledge_survives_a_new_session() {
    let setup = Setup::new();
    let mut session = setup.session();
    session.on_run_start(&setup.host);
    session.on_run_finished(&setup.host, "skse64_loader.exe", 0, true).unwrap();
    session.save().unwrap();

    let reopened = setup.session();
    assert_eq!(reopened.knowledge(), session.knowledge());
}

#[test]
fn corrupt_store_starts_a_fresh_session() {
    let setup = Setup::new();
    let config = setup.config();
    fs::create_dir_all(&config.data_dir).unwrap();
    fs::write(config.store_path(), b"garbage").unwrap();

    let session = OracleSession::open(config);
    assert!(session.knowledge().is_empty());
}

#[test]
fn manifest_host_round_trips_sampled_priorities() {
    let setup = Setup::new();
    let manifest = setup.tree.path().join("manifest.json");
    fs::write(&manifest, serde_json::to_string(&setup.host).unwrap()).unwrap();

    let mut host = ManifestHost::open(&manifest).unwrap();
    let mut session = setup.session();
    session.on_run_start(&host);
    let (order, _) = session.sample_or_shuffle(&mut host).unwrap();
    host.save().unwrap();

    let reopened = ManifestHost::open(&manifest).unwrap();
    let sampled: Vec<_> = reopened.host().names()[1..]
        .iter()
        .map(|n| session.id_of(n).unwrap())
        .collect();
    assert_eq!(sampled, order);
}
