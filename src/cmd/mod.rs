use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{info, instrument, warn};

use crate::config::{load_config_from_path, GeneralSettings};
use crate::errors::Result;
use crate::scenario::{self, Context, SuiteReport};

/// CLI
#[derive(Parser, Debug)]
#[command(
    name = "apicontract",
    version,
    about = "Run black-box contract checks against a token-authenticated REST API.",
    long_about = "Run black-box contract checks against a token-authenticated REST API.\n\n\
Resources:\n  • YAML config: a `general` section (base URL, tokens, timeouts) plus one section per scenario\n  • Scenarios: public_profile, own_profile, user_repos, own_repos, repo_commits, profile_update, workflow\n  • Exit status: 0 all checks passed or skipped, 1 a check failed, 2 the suite could not start"
)]
pub struct Cli {
    #[arg(
        long = "config",
        short = 'c',
        value_name = "FILE",
        default_value = "config.yaml"
    )]
    pub config: String,

    /// Scenario to run; repeat for several. Defaults to all.
    #[arg(long = "scenario", short = 's', value_name = "NAME")]
    pub scenarios: Vec<String>,

    /// Skip TLS certificate validation (test environments only).
    #[arg(long)]
    pub insecure: bool,

    /// Print scenario names and exit.
    #[arg(long)]
    pub list: bool,
}

#[instrument(skip_all, fields(cfg_path = %cli.config))]
pub async fn run_suite(cli: &Cli) -> Result<SuiteReport> {
    info!("starting apicontract run");
    let t0 = Instant::now();

    let cfg = Arc::new(load_config_from_path(&cli.config)?);
    info!("loaded yaml config");

    let mut general = GeneralSettings::from_config(&cfg)?;
    if cli.insecure {
        warn!("--insecure: TLS certificate validation disabled");
        general.danger_accept_invalid_certs = true;
    }

    let scenarios = scenario::select(&cli.scenarios)?;
    for s in &scenarios {
        if cfg.section(s.name()).is_none() {
            warn!(scenario = s.name(), "no config section; its checks will fail");
        }
    }

    let ctx = Context::new(cfg, general)?;
    let report = scenario::run_all(&ctx, &scenarios).await;

    let (passed, failed, skipped) = report.totals();
    info!(
        passed,
        failed,
        skipped,
        total_ms = t0.elapsed().as_millis() as u64,
        "all scenarios finished"
    );
    Ok(report)
}

pub fn scenario_names() -> Vec<&'static str> {
    scenario::registry().iter().map(|s| s.name()).collect()
}
