use std::collections::BTreeMap;

use minijinja::{Environment, UndefinedBehavior};
use url::Url;

use crate::errors::Result;

/// Base URL plus a path template such as `/repos/{{ owner }}/{{ repo }}/commits`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    path_template: String,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>, path_template: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path_template: path_template.into(),
        }
    }

    /// Fill the placeholders and join onto the base URL.
    ///
    /// Joining is textual so a base with a path prefix (`https://ghe.local/api/v3`) keeps it.
    pub fn url(&self, vars: &[(&str, &str)]) -> Result<Url> {
        let path = render_path(&self.path_template, vars)?;
        let base = self.base_url.trim_end_matches('/');
        let url = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        Ok(Url::parse(&url)?)
    }
}

/// Render a path template. Any placeholder without a value is an error.
pub fn render_path(template: &str, vars: &[(&str, &str)]) -> Result<String> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);

    let ctx: BTreeMap<&str, &str> = vars.iter().copied().collect();
    Ok(env.render_str(template, ctx)?)
}
