//! Anonymous lookup of a user's public profile (`/users/{{ username }}`).

use async_trait::async_trait;

use crate::check::{assert_field_eq, assert_fields, assert_status};
use crate::errors::Result;
use crate::http::ApiRequest;
use crate::scenario::{Context, Scenario, ScenarioReport};

pub struct PublicProfile;

const SECTION: &str = "public_profile";

#[async_trait]
impl Scenario for PublicProfile {
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

async fn get_user(ctx: &Context, username: &str) -> Result<crate::http::ApiResponse> {
    let section = ctx.section(SECTION)?;
    let url = ctx.url(section, "endpoint", &[("username", username)])?;
    ctx.client.send(ApiRequest::get(url)).await
}

async fn response_200(ctx: &Context) -> Result<()> {
    let username = ctx.section(SECTION)?.string("username")?;
    let resp = get_user(ctx, &username).await?;
    assert_status(&resp, 200)?;
    assert_field_eq(&resp.body, "login", &username)
}

async fn response_404(ctx: &Context) -> Result<()> {
    let wrong = ctx.section(SECTION)?.string("wrong_username")?;
    let resp = get_user(ctx, &wrong).await?;
    assert_status(&resp, 404)
}

async fn response_items(ctx: &Context) -> Result<()> {
    let section = ctx.section(SECTION)?;
    let username = section.string("username")?;
    let items = section.list("items")?;
    let resp = get_user(ctx, &username).await?;
    assert_status(&resp, 200)?;
    assert_fields(&resp.body, &items)
}
