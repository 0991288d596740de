//! The authenticated user's own profile (`/user`).

use async_trait::async_trait;

use crate::check::assert_fields;
use crate::errors::Result;
use crate::scenario::auth::{expect_forbidden, expect_not_modified, expect_unauthorized, fetch_ok};
use crate::scenario::{Context, Scenario, ScenarioReport};

pub struct OwnProfile;

const SECTION: &str = "own_profile";

#[async_trait]
impl Scenario for OwnProfile {
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
    fetch_ok(ctx, &endpoint(ctx)?).await.map(drop)
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
    assert_fields(&resp.body, &items)
}
