//! Status-code checks shared by the endpoints that sit behind a token.

use url::Url;

use crate::check::assert_status;
use crate::errors::{ContractError, Result};
use crate::http::{ApiRequest, ApiResponse};
use crate::scenario::Context;

/// GET with the configured valid token; expects 200.
pub(crate) async fn fetch_ok(ctx: &Context, url: &Url) -> Result<ApiResponse> {
    let resp = ctx
        .client
        .send(ApiRequest::get(url.clone()).token(&ctx.general.token))
        .await?;
    assert_status(&resp, 200)?;
    Ok(resp)
}

/// Every configured invalid token must be turned away with 401.
pub(crate) async fn expect_unauthorized(ctx: &Context, url: &Url) -> Result<()> {
    if ctx.general.invalid_tokens.is_empty() {
        return Err(ContractError::Precondition(
            "no `general.invalid_tokens` configured".into(),
        ));
    }
    for token in &ctx.general.invalid_tokens {
        let resp = ctx
            .client
            .send(ApiRequest::get(url.clone()).token(token))
            .await?;
        assert_status(&resp, 401)?;
    }
    Ok(())
}

/// Replaying the first response's ETag through `If-None-Match` must yield 304.
pub(crate) async fn expect_not_modified(ctx: &Context, url: &Url) -> Result<()> {
    let first = fetch_ok(ctx, url).await?;
    let etag = first.etag().ok_or_else(|| {
        ContractError::SchemaMismatch("response carries no `ETag` header".into())
    })?;

    let resp = ctx
        .client
        .send(
            ApiRequest::get(url.clone())
                .token(&ctx.general.token)
                .if_none_match(etag)?,
        )
        .await?;
    assert_status(&resp, 304)
}

/// Needs `general.forbidden_token`: a token the API recognises but refuses.
pub(crate) async fn expect_forbidden(ctx: &Context, url: &Url) -> Result<()> {
    let token = ctx.general.forbidden_token.as_ref().ok_or_else(|| {
        ContractError::Precondition("no `general.forbidden_token` configured".into())
    })?;
    let resp = ctx
        .client
        .send(ApiRequest::get(url.clone()).token(token))
        .await?;
    assert_status(&resp, 403)
}
