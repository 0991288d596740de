//! Eight-step composite workflow. Steps depend on each other (the profile patch
//! must land before it is read back, repo listing feeds the commit steps), so the
//! whole chain is a single check that stops at the first failing step.

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::check::{as_array, assert_nested_keys, assert_status};
use crate::errors::{ContractError, Result};
use crate::http::ApiRequest;
use crate::scenario::auth::fetch_ok;
use crate::scenario::profile_update::ProfilePatch;
use crate::scenario::{Context, Scenario, ScenarioReport};

const SECTION: &str = "workflow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkflowState {
    Unauthenticated,
    Authenticated,
    ProfileUpdated,
    ProfileVerified,
    ReposListed,
    ErrorCaseChecked,
    FirstRepoCommitsChecked,
    LastRepoCommitsChecked,
}

impl WorkflowState {
    pub const ORDER: [WorkflowState; 8] = [
        WorkflowState::Unauthenticated,
        WorkflowState::Authenticated,
        WorkflowState::ProfileUpdated,
        WorkflowState::ProfileVerified,
        WorkflowState::ReposListed,
        WorkflowState::ErrorCaseChecked,
        WorkflowState::FirstRepoCommitsChecked,
        WorkflowState::LastRepoCommitsChecked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Unauthenticated => "Unauthenticated",
            WorkflowState::Authenticated => "Authenticated",
            WorkflowState::ProfileUpdated => "ProfileUpdated",
            WorkflowState::ProfileVerified => "ProfileVerified",
            WorkflowState::ReposListed => "ReposListed",
            WorkflowState::ErrorCaseChecked => "ErrorCaseChecked",
            WorkflowState::FirstRepoCommitsChecked => "FirstRepoCommitsChecked",
            WorkflowState::LastRepoCommitsChecked => "LastRepoCommitsChecked",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs, all read before the first request goes out.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub patch: ProfilePatch,
    pub repo_names: Vec<String>,
    pub error_owner: String,
    pub error_repo: String,
    pub first_repo_name: String,
    pub last_repo_name: String,
    pub commit_items: Vec<String>,
}

impl WorkflowSettings {
    pub fn from_context(ctx: &Context) -> Result<Self> {
        let s = ctx.section(SECTION)?;
        // fail on missing templates now rather than mid-run
        for key in ["profile_endpoint", "repos_endpoint", "commits_endpoint"] {
            s.string(key)?;
        }
        Ok(Self {
            patch: ProfilePatch::from_section(s)?,
            repo_names: s.list("repo_names")?,
            error_owner: s.string("error_owner")?,
            error_repo: s.string("error_repo")?,
            first_repo_name: s.string("first_repo_name")?,
            last_repo_name: s.string("last_repo_name")?,
            commit_items: s.list("commit_items")?,
        })
    }
}

/// A repository as seen in step 5, reused by steps 7 and 8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    fn from_value(repo: &Value) -> Result<Self> {
        let name = repo.get("name").and_then(Value::as_str);
        let owner = repo
            .get("owner")
            .and_then(|o| o.get("login"))
            .and_then(Value::as_str);
        match (owner, name) {
            (Some(owner), Some(name)) => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(ContractError::SchemaMismatch(
                "repository entry lacks `name` or `owner.login`".into(),
            )),
        }
    }
}

pub struct Workflow<'a> {
    ctx: &'a Context,
    settings: WorkflowSettings,
    reached: Option<WorkflowState>,
    repos: Vec<RepoRef>,
}

impl<'a> Workflow<'a> {
    pub fn new(ctx: &'a Context) -> Result<Self> {
        Ok(Self {
            ctx,
            settings: WorkflowSettings::from_context(ctx)?,
            reached: None,
            repos: Vec::new(),
        })
    }

    /// Last state whose step succeeded.
    pub fn reached(&self) -> Option<WorkflowState> {
        self.reached
    }

    pub fn repos(&self) -> &[RepoRef] {
        &self.repos
    }

    pub async fn run(&mut self) -> Result<()> {
        for state in WorkflowState::ORDER {
            self.enter(state)
                .await
                .map_err(|source| ContractError::Step {
                    step: state.to_string(),
                    source: Box::new(source),
                })?;
            info!(state = %state, "workflow step passed");
            self.reached = Some(state);
        }
        Ok(())
    }

    async fn enter(&mut self, state: WorkflowState) -> Result<()> {
        match state {
            WorkflowState::Unauthenticated => self.deny_anonymous().await,
            WorkflowState::Authenticated => self.authenticate().await,
            WorkflowState::ProfileUpdated => self.update_profile().await,
            WorkflowState::ProfileVerified => self.verify_profile().await,
            WorkflowState::ReposListed => self.list_repos().await,
            WorkflowState::ErrorCaseChecked => self.missing_repo_commits().await,
            WorkflowState::FirstRepoCommitsChecked => {
                let repo = self.repos.first().cloned();
                let expected = self.settings.first_repo_name.clone();
                self.repo_commits(repo, &expected, "first").await
            }
            WorkflowState::LastRepoCommitsChecked => {
                let repo = self.repos.last().cloned();
                let expected = self.settings.last_repo_name.clone();
                self.repo_commits(repo, &expected, "last").await
            }
        }
    }

    fn url(&self, key: &str, vars: &[(&str, &str)]) -> Result<url::Url> {
        self.ctx.url(self.ctx.section(SECTION)?, key, vars)
    }

    async fn deny_anonymous(&self) -> Result<()> {
        let resp = self
            .ctx
            .client
            .send(ApiRequest::get(self.url("profile_endpoint", &[])?))
            .await?;
        assert_status(&resp, 401)
    }

    async fn authenticate(&self) -> Result<()> {
        fetch_ok(self.ctx, &self.url("profile_endpoint", &[])?)
            .await
            .map(drop)
    }

    async fn update_profile(&self) -> Result<()> {
        let req = ApiRequest::patch(self.url("profile_endpoint", &[])?)
            .token(&self.ctx.general.token)
            .json(&self.settings.patch)?;
        let resp = self.ctx.client.send(req).await?;
        assert_status(&resp, 200)
    }

    async fn verify_profile(&self) -> Result<()> {
        let resp = fetch_ok(self.ctx, &self.url("profile_endpoint", &[])?).await?;
        self.settings.patch.verify(&resp.body)
    }

    async fn list_repos(&mut self) -> Result<()> {
        let resp = fetch_ok(self.ctx, &self.url("repos_endpoint", &[])?).await?;
        let repos = as_array(&resp.body)?
            .iter()
            .map(RepoRef::from_value)
            .collect::<Result<Vec<_>>>()?;

        let actual: BTreeSet<&str> = repos.iter().map(|r| r.name.as_str()).collect();
        let expected: BTreeSet<&str> = self
            .settings
            .repo_names
            .iter()
            .map(String::as_str)
            .collect();
        if actual != expected {
            return Err(ContractError::SchemaMismatch(format!(
                "returned repo list {actual:?} does not match expected {expected:?}"
            )));
        }
        self.repos = repos;
        Ok(())
    }

    async fn missing_repo_commits(&self) -> Result<()> {
        let url = self.url(
            "commits_endpoint",
            &[
                ("owner", self.settings.error_owner.as_str()),
                ("repo", self.settings.error_repo.as_str()),
            ],
        )?;
        let resp = self
            .ctx
            .client
            .send(ApiRequest::get(url).token(&self.ctx.general.token))
            .await?;
        assert_status(&resp, 404)
    }

    /// Commits of a repo taken from the live listing, not from config.
    async fn repo_commits(
        &self,
        repo: Option<RepoRef>,
        expected_name: &str,
        which: &str,
    ) -> Result<()> {
        let repo =
            repo.ok_or_else(|| ContractError::SchemaMismatch("repository list is empty".into()))?;
        if repo.name != expected_name {
            return Err(ContractError::ValueMismatch {
                field: format!("{which} repo name"),
                expected: format!("{expected_name:?}"),
                actual: format!("{:?}", repo.name),
            });
        }

        let url = self.url(
            "commits_endpoint",
            &[("owner", repo.owner.as_str()), ("repo", repo.name.as_str())],
        )?;
        let resp = fetch_ok(self.ctx, &url).await?;
        for commit in as_array(&resp.body)? {
            assert_nested_keys(commit, &self.settings.commit_items)?;
        }
        Ok(())
    }
}

pub struct WorkflowScenario;

#[async_trait]
impl Scenario for WorkflowScenario {
    fn name(&self) -> &'static str {
        SECTION
    }

    async fn run(&self, ctx: &Context) -> ScenarioReport {
        let mut report = ScenarioReport::new(SECTION);
        report.check("workflow", run_workflow(ctx)).await;
        report
    }
}

async fn run_workflow(ctx: &Context) -> Result<()> {
    let mut workflow = Workflow::new(ctx)?;
    let result = workflow.run().await;
    info!(reached = ?workflow.reached(), "workflow finished");
    result
}
