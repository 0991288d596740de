use http::Extensions;
use reqwest::{Client, Request, Response};
use reqwest_middleware::{
    ClientBuilder, ClientWithMiddleware, Middleware, Next, Result as MwResult,
};
use reqwest_retry::{
    default_on_request_failure, policies::ExponentialBackoff, RetryTransientMiddleware,
    Retryable, RetryableStrategy,
};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::Retry;

/// Number of times the inner stack has been entered for one logical request.
#[derive(Debug, Default, Clone, Copy)]
struct Attempts(u32);

/// Sits below the retry layer, so it sees every individual attempt.
struct AttemptTracker;

#[async_trait::async_trait]
impl Middleware for AttemptTracker {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> MwResult<Response> {
        let attempt = {
            let count = extensions.get_or_insert_default::<Attempts>();
            count.0 += 1;
            count.0
        };
        let started = Instant::now();
        let method = req.method().clone();
        let url = req.url().clone();

        let res = next.run(req, extensions).await;
        if let Err(err) = &res {
            warn!(
                attempt,
                %method,
                %url,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %err,
                "transport attempt failed"
            );
        }
        res
    }
}

/// Sits above the retry layer: one line per logical request.
struct RequestSummary;

#[async_trait::async_trait]
impl Middleware for RequestSummary {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> MwResult<Response> {
        let started = Instant::now();
        let method = req.method().clone();
        let url = req.url().clone();

        let res = next.run(req, extensions).await;

        let attempts = extensions.get::<Attempts>().map_or(1, |c| c.0);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &res {
            Ok(resp) => debug!(
                %method,
                %url,
                status = resp.status().as_u16(),
                attempts,
                elapsed_ms,
                "request completed"
            ),
            Err(err) => warn!(
                %method,
                %url,
                attempts,
                elapsed_ms,
                error = %err,
                "request gave up"
            ),
        }
        res
    }
}

/// Retries connect/timeout style failures only. Any HTTP response, 5xx included,
/// is handed back untouched because the status code is what the checks assert on.
pub struct TransportOnly;

impl RetryableStrategy for TransportOnly {
    fn handle(&self, res: &MwResult<Response>) -> Option<Retryable> {
        match res {
            Ok(_) => None,
            Err(err) => default_on_request_failure(err),
        }
    }
}

pub fn build_client_with_retry(client: Client, retry: &Retry) -> ClientWithMiddleware {
    let policy = ExponentialBackoff::builder()
        .retry_bounds(
            Duration::from_secs(retry.min_delay_secs),
            Duration::from_secs(retry.max_delay_secs),
        )
        .build_with_max_retries(retry.max_retries);

    ClientBuilder::new(client)
        .with(RequestSummary)
        .with(RetryTransientMiddleware::new_with_policy_and_strategy(
            policy,
            TransportOnly,
        ))
        .with(AttemptTracker)
        .build()
}
