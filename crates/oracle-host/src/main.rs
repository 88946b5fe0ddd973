use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use oracle_core::Polarity;
use oracle_host::logging::init_tracing;
use oracle_host::{ManifestHost, OracleConfig, OracleSession, Strategy};
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("oracle")
        .version(oracle_host::VERSION)
        .about("Learns safe component orders from pass/fail runs")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("manifest")
                .long("manifest")
                .global(true)
                .default_value("manifest.json")
                .value_parser(value_parser!(PathBuf))
                .help("JSON component manifest"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Override the knowledge base directory"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(Command::new("resolve").about("Identify every active component"))
        .subcommand(
            Command::new("record")
                .about("Record a finished run")
                .arg(
                    Arg::new("exe")
                        .long("exe")
                        .required(true)
                        .help("Executable that ran"),
                )
                .arg(
                    Arg::new("exit-code")
                        .long("exit-code")
                        .default_value("0")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i32))
                        .help("Exit code of the run"),
                )
                .arg(
                    Arg::new("rejected")
                        .long("rejected")
                        .action(ArgAction::SetTrue)
                        .help("The user reported the run as broken"),
                ),
        )
        .subcommand(
            Command::new("sample")
                .about("Apply a new order to the manifest")
                .arg(
                    Arg::new("random")
                        .long("random")
                        .action(ArgAction::SetTrue)
                        .help("Use a uniformly random permutation"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("random")
                        .help("Fail instead of shuffling when no consistent order exists"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                ),
        )
        .subcommand(
            Command::new("audit")
                .about("Check the manifest's current order against evidence")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("find")
                .about("Look up known components by name prefix")
                .arg(Arg::new("prefix").required(true)),
        )
        .subcommand(
            Command::new("relations")
                .about("Print both relation graphs")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> Result<OracleConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => OracleConfig::load(path)?,
        None => OracleConfig::default(),
    };
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config = config.with_data_dir(dir);
    }
    Ok(config)
}

fn open_manifest(matches: &ArgMatches) -> Result<ManifestHost> {
    let path = matches
        .get_one::<PathBuf>("manifest")
        .context("no manifest given")?;
    Ok(ManifestHost::open(path)?)
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    init_tracing(&config.log_level, matches.get_flag("log-json"))
        .map_err(|e| anyhow::anyhow!("cannot install logger: {e}"))?;

    tracing::info!(version = oracle_host::VERSION, store = %config.store_path().display(), "oracle starting");

    let Some((command, args)) = matches.subcommand() else {
        anyhow::bail!("no command given");
    };

    let mut host = open_manifest(&matches)?;
    let mut session = OracleSession::open(config);
    if let Some(seed) = args.try_get_one::<u64>("seed").ok().flatten() {
        session = session.with_seed(*seed);
    }
    let report = session.resolve(&host);

    match command {
        "resolve" => {
            println!("Resolved: {}", report.resolved.len());
            for resolved in &report.resolved {
                println!("  {} : {}", resolved.component.name, resolved.id);
            }
            if !report.is_complete() {
                println!("Skipped: {}", report.failures.len());
                for failure in &report.failures {
                    println!("  {} : {}", failure.name, failure.error);
                }
            }
            session.save()?;
        }
        "record" => {
            let exe = args
                .get_one::<String>("exe")
                .context("missing --exe")?;
            let code = *args.get_one::<i32>("exit-code").context("missing --exit-code")?;
            let confirmed = !args.get_flag("rejected");

            match session.on_run_finished(&host, exe, code, confirmed)? {
                Some(summary) => {
                    println!("Run recorded: {} positions, {} relations retired", summary.positions, summary.removed);
                    session.save()?;
                }
                None => println!("Environment not tracked, nothing recorded"),
            }
        }
        "sample" => {
            let (order, strategy) = if args.get_flag("random") {
                (session.sample(&mut host, Strategy::Random)?, Strategy::Random)
            } else if args.get_flag("strict") {
                (session.sample(&mut host, Strategy::Derived)?, Strategy::Derived)
            } else {
                session.sample_or_shuffle(&mut host)?
            };
            host.save()?;
            session.save()?;

            println!("Applied {strategy:?} order:");
            for id in &order {
                println!("  {}", session.knowledge().display_name(id));
            }
        }
        "audit" => {
            let findings = session.audit_active(&host)?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&findings)?);
            } else if findings.is_empty() {
                println!("No contradictions");
            } else {
                println!("Contradictions: {}", findings.len());
                for finding in &findings {
                    println!("  {} before {}", finding.earlier, finding.later);
                }
            }
            std::process::exit(i32::from(!findings.is_empty()));
        }
        "find" => {
            let prefix = args.get_one::<String>("prefix").context("missing prefix")?;
            let found = session.find(prefix);
            if found.is_empty() {
                println!("No component found");
            }
            for (name, id) in found {
                println!("{name}:{id}");
            }
        }
        "relations" => {
            let view = session.graph_view();
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&view.snapshot())?);
            } else {
                for polarity in [Polarity::Success, Polarity::Failure] {
                    println!("{polarity}:");
                    for (from, to) in view.edges(polarity) {
                        println!("  {} -> {}", view.name(&from), view.name(&to));
                    }
                }
            }
        }
        other => anyhow::bail!("unknown command '{other}'"),
    }

    Ok(())
}
