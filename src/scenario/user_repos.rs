//! Public repositories of a named user (`/users/{{ username }}/repos`).

use async_trait::async_trait;

use crate::check::{as_array, assert_fields, assert_status, first_element};
use crate::errors::Result;
use crate::http::{ApiRequest, ApiResponse};
use crate::scenario::{Context, Scenario, ScenarioReport};

pub struct UserRepos;

const SECTION: &str = "user_repos";

#[async_trait]
impl Scenario for UserRepos {
    fn name(&self) -> &'static str {
        SECTION
    }

    async fn run(&self, ctx: &Context) -> ScenarioReport {
        let mut report = ScenarioReport::new(SECTION);
        report.check("response_200", response_200(ctx)).await;
        report.check("response_404", response_404(ctx)).await;
        report.check("response_items", response_items(ctx)).await;
        report
    }
}

async fn get_repos(ctx: &Context, username: &str) -> Result<ApiResponse> {
    let section = ctx.section(SECTION)?;
    let url = ctx.url(section, "endpoint", &[("username", username)])?;
    ctx.client.send(ApiRequest::get(url)).await
}

async fn response_200(ctx: &Context) -> Result<()> {
    let username = ctx.section(SECTION)?.string("username")?;
    let resp = get_repos(ctx, &username).await?;
    assert_status(&resp, 200)?;
    as_array(&resp.body).map(drop)
}

async fn response_404(ctx: &Context) -> Result<()> {
    let wrong = ctx.section(SECTION)?.string("wrong_username")?;
    let resp = get_repos(ctx, &wrong).await?;
    assert_status(&resp, 404)
}

async fn response_items(ctx: &Context) -> Result<()> {
    let section = ctx.section(SECTION)?;
    let username = section.string("username")?;
    let items = section.list("items")?;
    let resp = get_repos(ctx, &username).await?;
    assert_status(&resp, 200)?;
    assert_fields(first_element(&resp.body)?, &items)
}
