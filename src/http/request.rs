use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ETAG, IF_NONE_MATCH};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::errors::Result;
use crate::http::Credential;

/// One REST call, built up fluently and handed to `ApiClient::send`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) headers: Vec<(HeaderName, HeaderValue)>,
    pub(crate) token: Option<Credential>,
    pub(crate) body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            params: Vec::new(),
            headers: Vec::new(),
            token: None,
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn patch(url: Url) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(key.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.headers.push((name, value));
        Ok(self)
    }

    pub fn token(mut self, credential: &Credential) -> Self {
        self.token = Some(credential.clone());
        self
    }

    pub fn if_none_match(self, etag: &str) -> Result<Self> {
        self.header(IF_NONE_MATCH.as_str(), etag)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }
}

/// What came back: status, headers (case-insensitive) and the parsed body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl ApiResponse {
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    pub fn etag(&self) -> Option<&str> {
        self.header(ETAG.as_str())
    }
}

/// Empty bodies (304, 204) become `null`; non-JSON bodies are logged and also `null`.
pub(crate) fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    match serde_json::from_slice(bytes) {
        Ok(v) => v,
        Err(err) => {
            warn!(%err, bytes = bytes.len(), "response body is not JSON");
            Value::Null
        }
    }
}
