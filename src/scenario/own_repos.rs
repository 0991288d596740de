//! Repositories visible to the authenticated user (`/user/repos`).

use async_trait::async_trait;

use crate::check::{as_array, assert_fields, first_element};
use crate::errors::Result;
use crate::scenario::auth::{expect_forbidden, expect_not_modified, expect_unauthorized, fetch_ok};
use crate::scenario::{Context, Scenario, ScenarioReport};

pub struct OwnRepos;

const SECTION: &str = "own_repos";

#[async_trait]
impl Scenario for OwnRepos {
    fn name(&self) -> &'static str {
        SECTION
    }

    async fn run(&self, ctx: &Context) -> ScenarioReport {
        let mut report = ScenarioReport::new(SECTION);
        report.check("response_200", response_200(ctx)).await;
        report.check("response_401", response_401(ctx)).await;
        report.check("response_304", response_304(ctx)).await;
        report.check("response_403", response_403(ctx)).await;
        report.check("response_items", response_items(ctx)).await;
        report
    }
}

fn endpoint(ctx: &Context) -> Result<url::Url> {
    ctx.url(ctx.section(SECTION)?, "endpoint", &[])
}

async fn response_200(ctx: &Context) -> Result<()> {
    let resp = fetch_ok(ctx, &endpoint(ctx)?).await?;
    as_array(&resp.body).map(drop)
}

async fn response_401(ctx: &Context) -> Result<()> {
    expect_unauthorized(ctx, &endpoint(ctx)?).await
}

async fn response_304(ctx: &Context) -> Result<()> {
    expect_not_modified(ctx, &endpoint(ctx)?).await
}

async fn response_403(ctx: &Context) -> Result<()> {
    expect_forbidden(ctx, &endpoint(ctx)?).await
}

async fn response_items(ctx: &Context) -> Result<()> {
    let items = ctx.section(SECTION)?.list("items")?;
    let resp = fetch_ok(ctx, &endpoint(ctx)?).await?;
    assert_fields(first_element(&resp.body)?, &items)
}
