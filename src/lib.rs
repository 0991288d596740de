//! Black-box HTTP contract suite for token-authenticated REST APIs.
//!
//! - `config`: YAML settings tree, general settings, path templates
//! - `http`: request builder, client with transport retry, response descriptor
//! - `check`: status / field-set / nested-key assertions
//! - `scenario`: the GitHub REST scenarios and the runner that reports on them

pub mod check;
pub mod cmd;
pub mod config;
pub mod errors;
pub mod http;
pub mod log;
pub mod scenario;
pub mod utils;
