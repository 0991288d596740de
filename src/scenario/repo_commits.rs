//! Anonymous commit listing for a repository (`/repos/{{ owner }}/{{ repo }}/commits`),
//! including pagination via `per_page`.

use async_trait::async_trait;

use crate::check::{as_array, assert_header, assert_len, assert_nested_keys, assert_status};
use crate::errors::{ContractError, Result};
use crate::http::{ApiRequest, ApiResponse};
use crate::scenario::{Context, Scenario, ScenarioReport};

pub struct RepoCommits;

const SECTION: &str = "repo_commits";

#[async_trait]
impl Scenario for RepoCommits {
    fn name(&self) -> &'static str {
        SECTION
    }

    async fn run(&self, ctx: &Context) -> ScenarioReport {
        let mut report = ScenarioReport::new(SECTION);
        report.check("response_200", response_200(ctx)).await;
        report
            .check("response_404_bad_owner", response_404_bad_owner(ctx))
            .await;
        report
            .check("response_404_bad_repo", response_404_bad_repo(ctx))
            .await;
        report.check("unpaginated", unpaginated(ctx)).await;
        report.check("pagination", pagination(ctx)).await;
        report.check("response_items", response_items(ctx)).await;
        report
    }
}

async fn get_commits(
    ctx: &Context,
    owner: &str,
    repo: &str,
    per_page: Option<u64>,
) -> Result<ApiResponse> {
    let section = ctx.section(SECTION)?;
    let url = ctx.url(section, "endpoint", &[("owner", owner), ("repo", repo)])?;
    let mut req = ApiRequest::get(url);
    if let Some(n) = per_page {
        req = req.param("per_page", n);
    }
    ctx.client.send(req).await
}

fn target(ctx: &Context) -> Result<(String, String)> {
    let section = ctx.section(SECTION)?;
    Ok((section.string("owner")?, section.string("repo")?))
}

async fn response_200(ctx: &Context) -> Result<()> {
    let (owner, repo) = target(ctx)?;
    let resp = get_commits(ctx, &owner, &repo, None).await?;
    assert_status(&resp, 200)
}

async fn response_404_bad_owner(ctx: &Context) -> Result<()> {
    let (_, repo) = target(ctx)?;
    let wrong = ctx.section(SECTION)?.string("wrong_owner")?;
    let resp = get_commits(ctx, &wrong, &repo, None).await?;
    assert_status(&resp, 404)
}

async fn response_404_bad_repo(ctx: &Context) -> Result<()> {
    let (owner, _) = target(ctx)?;
    let wrong = ctx.section(SECTION)?.string("wrong_repo")?;
    let resp = get_commits(ctx, &owner, &wrong, None).await?;
    assert_status(&resp, 404)
}

/// Without `per_page` the body is a bare list of commits, not a wrapper object.
async fn unpaginated(ctx: &Context) -> Result<()> {
    let (owner, repo) = target(ctx)?;
    let resp = get_commits(ctx, &owner, &repo, None).await?;
    assert_status(&resp, 200)?;
    as_array(&resp.body).map(drop)
}

async fn pagination(ctx: &Context) -> Result<()> {
    let (owner, repo) = target(ctx)?;
    let per_page = ctx.section(SECTION)?.u64("per_page")?;
    if per_page == 0 {
        return Err(ContractError::Config(
            "`repo_commits.per_page` must be positive".into(),
        ));
    }
    let resp = get_commits(ctx, &owner, &repo, Some(per_page)).await?;
    assert_status(&resp, 200)?;
    assert_len(&resp.body, per_page as usize)?;
    assert_header(&resp, "Link")
}

/// Each commit exposes the configured keys somewhere in its object tree.
async fn response_items(ctx: &Context) -> Result<()> {
    let (owner, repo) = target(ctx)?;
    let items = ctx.section(SECTION)?.list("items")?;
    let resp = get_commits(ctx, &owner, &repo, None).await?;
    assert_status(&resp, 200)?;
    for commit in as_array(&resp.body)? {
        assert_nested_keys(commit, &items)?;
    }
    Ok(())
}
