//! Mutating the authenticated user's profile (`PATCH /user`).

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::check::{assert_field_eq, assert_status};
use crate::config::Section;
use crate::errors::Result;
use crate::http::ApiRequest;
use crate::scenario::auth::{expect_forbidden, expect_not_modified, expect_unauthorized, fetch_ok};
use crate::scenario::{Context, Scenario, ScenarioReport};

pub struct ProfileUpdate;

const SECTION: &str = "profile_update";

/// Body of the PATCH; read back field by field afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfilePatch {
    pub name: String,
    pub bio: String,
    pub blog: String,
}

impl ProfilePatch {
    pub fn from_section(section: &Section) -> Result<Self> {
        Ok(Self {
            name: section.string("new_name")?,
            bio: section.string("new_bio")?,
            blog: section.string("new_blog")?,
        })
    }

    /// The profile body must now carry exactly these values.
    pub fn verify(&self, profile: &Value) -> Result<()> {
        assert_field_eq(profile, "name", &self.name)?;
        assert_field_eq(profile, "bio", &self.bio)?;
        assert_field_eq(profile, "blog", &self.blog)
    }
}

#[async_trait]
impl Scenario for ProfileUpdate {
    fn name(&self) -> &'static str {
        SECTION
    }

    async fn run(&self, ctx: &Context) -> ScenarioReport {
        let mut report = ScenarioReport::new(SECTION);
        report.check("response_200", response_200(ctx)).await;
        report.check("response_401", response_401(ctx)).await;
        report.check("response_304", response_304(ctx)).await;
        report.check("response_403", response_403(ctx)).await;
        report.check("update_profile", update_profile(ctx)).await;
        report
            .check("unauthorized_update", unauthorized_update(ctx))
            .await;
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

async fn update_profile(ctx: &Context) -> Result<()> {
    let patch = ProfilePatch::from_section(ctx.section(SECTION)?)?;
    let url = endpoint(ctx)?;

    let resp = ctx
        .client
        .send(
            ApiRequest::patch(url.clone())
                .token(&ctx.general.token)
                .json(&patch)?,
        )
        .await?;
    assert_status(&resp, 200)?;

    let profile = fetch_ok(ctx, &url).await?;
    patch.verify(&profile.body)
}

/// A PATCH without any token must be refused.
async fn unauthorized_update(ctx: &Context) -> Result<()> {
    let resp = ctx
        .client
        .send(ApiRequest::patch(endpoint(ctx)?).json(&json!({"name": "Unauthorized Name"}))?)
        .await?;
    assert_status(&resp, 401)
}
