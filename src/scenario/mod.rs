use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{info, info_span, warn, Instrument};
use url::Url;

use crate::config::templating::Endpoint;
use crate::config::{ConfigTree, GeneralSettings, Section};
use crate::errors::{ContractError, Result};
use crate::http::ApiClient;

mod auth;
pub mod own_profile;
pub mod own_repos;
pub mod profile_update;
pub mod public_profile;
pub mod repo_commits;
pub mod user_repos;
pub mod workflow;

// ================== Context ==================

/// Everything a check needs. Built once per run and passed by reference.
pub struct Context {
    pub config: Arc<ConfigTree>,
    pub general: GeneralSettings,
    pub client: ApiClient,
}

impl Context {
    pub fn new(config: Arc<ConfigTree>, general: GeneralSettings) -> Result<Self> {
        let client = ApiClient::new(&general)?;
        Ok(Self {
            config,
            general,
            client,
        })
    }

    pub fn from_config(config: Arc<ConfigTree>) -> Result<Self> {
        let general = GeneralSettings::from_config(&config)?;
        Self::new(config, general)
    }

    pub fn section(&self, name: &str) -> Result<&Section> {
        self.config.require_section(name)
    }

    /// Resolve `<section>.<key>` as a path template against the base URL.
    pub fn url(&self, section: &Section, key: &str, vars: &[(&str, &str)]) -> Result<Url> {
        Endpoint::new(self.general.base_url.as_str(), section.string(key)?).url(vars)
    }
}

// ================== Reports ==================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed(String),
    Skipped(String),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

#[derive(Debug, Clone)]
pub struct CheckReport {
    pub name: String,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub scenario: String,
    pub checks: Vec<CheckReport>,
}

impl ScenarioReport {
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            checks: Vec::new(),
        }
    }

    /// Run one check to completion and record its outcome. Checks are independent:
    /// a failure here does not stop the next one.
    pub async fn check<F>(&mut self, name: &str, fut: F) -> &Outcome
    where
        F: Future<Output = Result<()>>,
    {
        let span = info_span!("check", scenario = %self.scenario, check = name);
        let started = Instant::now();
        let result = fut.instrument(span).await;
        let elapsed = started.elapsed();

        let outcome = match result {
            Ok(()) => {
                info!(scenario = %self.scenario, check = name, "PASS");
                Outcome::Passed
            }
            Err(err) if err.is_skip() => {
                info!(scenario = %self.scenario, check = name, reason = %err, "SKIP");
                Outcome::Skipped(err.to_string())
            }
            Err(err) => {
                warn!(scenario = %self.scenario, check = name, error = %err, "FAIL");
                Outcome::Failed(err.to_string())
            }
        };
        self.checks.push(CheckReport {
            name: name.to_string(),
            outcome,
            elapsed,
        });
        &self.checks[self.checks.len() - 1].outcome
    }

    pub fn outcome(&self, check: &str) -> Option<&Outcome> {
        self.checks
            .iter()
            .find(|c| c.name == check)
            .map(|c| &c.outcome)
    }

    pub fn failed(&self) -> usize {
        self.checks.iter().filter(|c| c.outcome.is_failed()).count()
    }

    pub fn passed(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.outcome == Outcome::Passed)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| matches!(c.outcome, Outcome::Skipped(_)))
            .count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.failed() == 0)
    }

    pub fn totals(&self) -> (usize, usize, usize) {
        self.scenarios.iter().fold((0, 0, 0), |(p, f, s), r| {
            (p + r.passed(), f + r.failed(), s + r.skipped())
        })
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for scenario in &self.scenarios {
            writeln!(f, "{}", scenario.scenario)?;
            for check in &scenario.checks {
                let ms = check.elapsed.as_millis();
                match &check.outcome {
                    Outcome::Passed => writeln!(f, "  PASS {} ({ms} ms)", check.name)?,
                    Outcome::Failed(msg) => {
                        writeln!(f, "  FAIL {} ({ms} ms): {msg}", check.name)?
                    }
                    Outcome::Skipped(why) => writeln!(f, "  SKIP {}: {why}", check.name)?,
                }
            }
        }
        let (passed, failed, skipped) = self.totals();
        write!(f, "{passed} passed, {failed} failed, {skipped} skipped")
    }
}

// ================== Scenarios ==================

/// A named group of checks against one area of the API. The name doubles as
/// the config section holding its inputs.
#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self, ctx: &Context) -> ScenarioReport;
}

/// All scenarios, in the order they run.
pub fn registry() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(public_profile::PublicProfile),
        Box::new(own_profile::OwnProfile),
        Box::new(user_repos::UserRepos),
        Box::new(own_repos::OwnRepos),
        Box::new(repo_commits::RepoCommits),
        Box::new(profile_update::ProfileUpdate),
        Box::new(workflow::WorkflowScenario),
    ]
}

/// Pick scenarios by name, keeping registry order. Empty selection means all.
pub fn select(names: &[String]) -> Result<Vec<Box<dyn Scenario>>> {
    let all = registry();
    if names.is_empty() {
        return Ok(all);
    }
    if let Some(unknown) = names
        .iter()
        .find(|n| !all.iter().any(|s| s.name() == n.as_str()))
    {
        return Err(ContractError::Config(format!("unknown scenario: {unknown}")));
    }
    Ok(all
        .into_iter()
        .filter(|s| names.iter().any(|n| n == s.name()))
        .collect())
}

/// Run scenarios one after another.
pub async fn run_all(ctx: &Context, scenarios: &[Box<dyn Scenario>]) -> SuiteReport {
    let mut suite = SuiteReport::default();
    for scenario in scenarios {
        let span = info_span!("scenario", name = scenario.name());
        let report = scenario.run(ctx).instrument(span).await;
        suite.scenarios.push(report);
    }
    suite
}
