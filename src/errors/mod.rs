// src/errors/mod.rs
use thiserror::Error;

/// Main error type for apicontract operations
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing setting `{key}` in section `{section}`")]
    MissingKey { section: String, key: String },

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Expected status code {expected}, but got {actual}")]
    UnexpectedStatus { expected: u16, actual: u16 },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Field `{field}` mismatch: expected {expected}, got {actual}")]
    ValueMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Precondition not met: {0}")]
    Precondition(String),

    #[error("Step {step} failed: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<ContractError>,
    },

    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid header name: {0}")]
    HeaderName(#[from] reqwest::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    HeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
}

impl ContractError {
    pub fn missing(section: impl Into<String>, key: impl Into<String>) -> Self {
        ContractError::MissingKey {
            section: section.into(),
            key: key.into(),
        }
    }

    /// True when the error means "could not run" rather than "contract violated".
    pub fn is_skip(&self) -> bool {
        match self {
            ContractError::Precondition(_) => true,
            ContractError::Step { source, .. } => source.is_skip(),
            _ => false,
        }
    }
}

/// Convenience Result type that uses ContractError
pub type Result<T> = std::result::Result<T, ContractError>;
