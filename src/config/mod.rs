use std::{fs::File, path::Path, time::Duration};

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::warn;
use url::Url;

use crate::errors::{ContractError, Result};
use crate::http::Credential;

pub mod templating;


pub const GENERAL: &str = "general";
const DEFAULT_ACCEPT: &str = "application/vnd.github.v3+json";

pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<ConfigTree> {
    let path = path.as_ref();
    let f = File::open(path)
        .map_err(|e| ContractError::Config(format!("cannot open {}: {e}", path.display())))?;
    serde_yaml::from_reader(f)
        .map_err(|e| ContractError::Config(format!("cannot parse {}: {e}", path.display())))
}

// ================== Settings tree ==================

/// A single configured value. Scalars, lists and nested mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Setting {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<Setting>),
    Map(IndexMap<String, Setting>),
}

impl Setting {
    fn as_text(&self) -> Option<String> {
        match self {
            Setting::Text(s) => Some(s.clone()),
            Setting::Integer(i) => Some(i.to_string()),
            Setting::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Setting::Null => "null",
            Setting::Bool(_) => "bool",
            Setting::Integer(_) => "integer",
            Setting::Float(_) => "float",
            Setting::Text(_) => "string",
            Setting::List(_) => "list",
            Setting::Map(_) => "mapping",
        }
    }
}

/// One named block of settings, e.g. `general` or `repo_commits`.
#[derive(Debug, Clone, Default)]
pub struct Section {
    name: String,
    settings: IndexMap<String, Setting>,
}

impl Section {
    pub fn new(name: impl Into<String>, settings: IndexMap<String, Setting>) -> Self {
        Self {
            name: name.into(),
            settings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Null counts as absent.
    pub fn get(&self, key: &str) -> Option<&Setting> {
        match self.settings.get(key) {
            Some(Setting::Null) | None => None,
            Some(s) => Some(s),
        }
    }

    pub fn require(&self, key: &str) -> Result<&Setting> {
        self.get(key)
            .ok_or_else(|| ContractError::missing(&self.name, key))
    }

    fn wrong_kind(&self, key: &str, want: &str, got: &Setting) -> ContractError {
        ContractError::Config(format!(
            "`{}.{key}` must be a {want}, found {}",
            self.name,
            got.kind()
        ))
    }

    /// Scalars render as text so unquoted YAML like `username: 1234` still works.
    pub fn string(&self, key: &str) -> Result<String> {
        let value = self.require(key)?;
        value
            .as_text()
            .ok_or_else(|| self.wrong_kind(key, "string", value))
    }

    pub fn opt_string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            Some(_) => self.string(key).map(Some),
            None => Ok(None),
        }
    }

    /// List items follow the same scalar-as-text rule as `string`.
    pub fn list(&self, key: &str) -> Result<Vec<String>> {
        match self.require(key)? {
            Setting::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.as_text().ok_or_else(|| {
                        ContractError::Config(format!(
                            "`{}.{key}[{i}]` must be a string, found {}",
                            self.name,
                            item.kind()
                        ))
                    })
                })
                .collect(),
            other => Err(self.wrong_kind(key, "list of strings", other)),
        }
    }

    pub fn u64(&self, key: &str) -> Result<u64> {
        match self.require(key)? {
            Setting::Integer(i) if *i >= 0 => Ok(*i as u64),
            other => Err(self.wrong_kind(key, "non-negative integer", other)),
        }
    }

    pub fn u64_or(&self, key: &str, default: u64) -> Result<u64> {
        match self.get(key) {
            Some(_) => self.u64(key),
            None => Ok(default),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            Some(Setting::Bool(b)) => Ok(*b),
            Some(other) => Err(self.wrong_kind(key, "bool", other)),
            None => Ok(default),
        }
    }

    /// Nested mapping, named `<parent>.<key>` for error messages.
    pub fn section(&self, key: &str) -> Result<Section> {
        match self.require(key)? {
            Setting::Map(map) => Ok(Section::new(format!("{}.{key}", self.name), map.clone())),
            other => Err(self.wrong_kind(key, "mapping", other)),
        }
    }

    /// Reads `<key>` inline, else the environment variable named by `<key>_env`.
    pub fn credential(&self, key: &str) -> Result<Option<Credential>> {
        if let Some(token) = self.opt_string(key)? {
            return Ok(Some(Credential::new(token)));
        }
        let env_key = format!("{key}_env");
        match self.opt_string(&env_key)? {
            Some(var) => match std::env::var(&var) {
                Ok(token) if !token.is_empty() => Ok(Some(Credential::new(token))),
                _ => Err(ContractError::Config(format!(
                    "`{}.{env_key}` names {var}, which is not set",
                    self.name
                ))),
            },
            None => Ok(None),
        }
    }
}

// ================== Config tree ==================

/// Whole document: section name -> settings. Read-only after load.
#[derive(Debug, Clone)]
pub struct ConfigTree {
    sections: IndexMap<String, Section>,
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct ConfigWire(IndexMap<String, IndexMap<String, Setting>>);

impl<'de> Deserialize<'de> for ConfigTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = ConfigWire::deserialize(deserializer)?;
        let sections: IndexMap<String, Section> = wire
            .0
            .into_iter()
            .map(|(name, settings)| (name.clone(), Section::new(name, settings)))
            .collect();
        if !sections.contains_key(GENERAL) {
            return Err(de::Error::custom("missing `general` section"));
        }
        Ok(ConfigTree { sections })
    }
}

impl ConfigTree {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).map_err(|e| ContractError::Config(e.to_string()))
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn require_section(&self, name: &str) -> Result<&Section> {
        self.section(name)
            .ok_or_else(|| ContractError::Config(format!("section not found in config: {name}")))
    }

    /// Section names in document order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

// ================== General settings ==================

/// Transport retry bounds. `max_retries` counts retries after the first attempt.
/// Only transport failures are retried, never responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retry {
    pub max_retries: u32,
    pub min_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_delay_secs: 1,
            max_delay_secs: 8,
        }
    }
}

impl Retry {
    fn from_section(section: &Section) -> Result<Self> {
        let d = Retry::default();
        let retry = Retry {
            max_retries: u32::try_from(section.u64_or("max_retries", d.max_retries.into())?)
                .map_err(|_| {
                    ContractError::Config(format!(
                        "`{}.max_retries` is out of range",
                        section.name()
                    ))
                })?,
            min_delay_secs: section.u64_or("min_delay_secs", d.min_delay_secs)?,
            max_delay_secs: section.u64_or("max_delay_secs", d.max_delay_secs)?,
        };
        if retry.min_delay_secs > retry.max_delay_secs {
            return Err(ContractError::Config(format!(
                "`{}`: min_delay_secs ({}) exceeds max_delay_secs ({})",
                section.name(),
                retry.min_delay_secs,
                retry.max_delay_secs
            )));
        }
        Ok(retry)
    }
}

#[derive(Debug, Clone)]
pub struct GeneralSettings {
    pub base_url: String,
    pub token: Credential,
    pub forbidden_token: Option<Credential>,
    pub invalid_tokens: Vec<Credential>,
    pub accept: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub danger_accept_invalid_certs: bool,
    pub retry: Retry,
}

impl GeneralSettings {
    pub fn from_config(cfg: &ConfigTree) -> Result<Self> {
        let g = cfg.require_section(GENERAL)?;

        let base_url = g.string("base_url")?.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        let token = g
            .credential("token")?
            .ok_or_else(|| ContractError::missing(GENERAL, "token"))?;
        let invalid_tokens = g
            .list("invalid_tokens")?
            .into_iter()
            .map(Credential::new)
            .collect();

        let retry = match g.get("retry") {
            Some(_) => Retry::from_section(&g.section("retry")?)?,
            None => Retry::default(),
        };

        let settings = GeneralSettings {
            base_url,
            token,
            forbidden_token: g.credential("forbidden_token")?,
            invalid_tokens,
            accept: g
                .opt_string("accept")?
                .unwrap_or_else(|| DEFAULT_ACCEPT.to_string()),
            user_agent: g.opt_string("user_agent")?.unwrap_or_else(|| {
                format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            }),
            timeout: Duration::from_secs(g.u64_or("timeout_secs", 30)?),
            connect_timeout: Duration::from_secs(g.u64_or("connect_timeout_secs", 10)?),
            danger_accept_invalid_certs: g.bool_or("danger_accept_invalid_certs", false)?,
            retry,
        };
        if settings.danger_accept_invalid_certs {
            warn!("TLS certificate validation is disabled by configuration");
        }
        Ok(settings)
    }
}
