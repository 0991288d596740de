pub mod request;

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, warn};

use crate::config::GeneralSettings;
use crate::errors::Result;
use crate::utils::http_retry;

pub use request::{ApiRequest, ApiResponse};

/// Token credential. Sent as `Authorization: token <value>`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub(crate) fn header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("token {}", self.0))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Request helper shared by every check. Holds the pooled client and retry stack.
#[derive(Clone)]
pub struct ApiClient {
    inner: ClientWithMiddleware,
}

impl ApiClient {
    pub fn new(settings: &GeneralSettings) -> Result<Self> {
        let client = build_client(settings)?;
        Ok(Self {
            inner: http_retry::build_client_with_retry(client, &settings.retry),
        })
    }

    /// Send once (transport retries aside) and return exactly what the server said.
    pub async fn send(&self, req: ApiRequest) -> Result<ApiResponse> {
        let method = req.method.clone();
        let url = req.url.clone();

        let mut rb = self.inner.request(req.method, req.url);
        if !req.params.is_empty() {
            rb = rb.query(&req.params);
        }
        for (name, value) in req.headers {
            rb = rb.header(name, value);
        }
        if let Some(token) = &req.token {
            rb = rb.header(AUTHORIZATION, token.header_value()?);
        }
        if let Some(body) = &req.body {
            rb = rb
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }

        let started = std::time::Instant::now();
        let resp = rb.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await?;

        debug!(
            %method,
            %url,
            status = status.as_u16(),
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "http response received"
        );

        Ok(ApiResponse {
            status,
            headers,
            body: request::parse_body(&bytes),
        })
    }
}

pub fn build_client(settings: &GeneralSettings) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_str(&settings.accept)?);

    if settings.danger_accept_invalid_certs {
        warn!("building HTTP client with TLS certificate validation disabled");
    }

    Ok(Client::builder()
        .default_headers(headers)
        .user_agent(settings.user_agent.clone())
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Some(std::time::Duration::from_secs(90)))
        .timeout(settings.timeout)
        .connect_timeout(settings.connect_timeout)
        .tcp_keepalive(Some(std::time::Duration::from_secs(60)))
        .danger_accept_invalid_certs(settings.danger_accept_invalid_certs)
        .build()?)
}
