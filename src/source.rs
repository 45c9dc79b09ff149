//! Client for the remote table store: a PostgREST-style endpoint exposing
//! "select all rows" over one logical table.
//!
//! Any non-success response is a batch-level failure; a failed fetch is
//! never partially applied.

use std::env;
use std::fmt;

use serde_json::Value;

pub const DEFAULT_TABLE: &str = "votos";

/// Connection settings, read from the environment the way the rest of the
/// app is configured (`PADRON_SOURCE_URL`, `PADRON_SOURCE_KEY`,
/// `PADRON_SOURCE_TABLE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
}

impl SourceConfig {
    pub fn from_env() -> Result<SourceConfig, ConfigError> {
        let base_url =
            env::var("PADRON_SOURCE_URL").map_err(|_| ConfigError::Missing("PADRON_SOURCE_URL"))?;
        let api_key =
            env::var("PADRON_SOURCE_KEY").map_err(|_| ConfigError::Missing("PADRON_SOURCE_KEY"))?;
        let table = env::var("PADRON_SOURCE_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string());
        Ok(SourceConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table,
        })
    }

    pub fn rows_url(&self) -> String {
        format!("{}/rest/v1/{}?select=*", self.base_url, self.table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(var) => write!(f, "environment variable {var} is not set"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug)]
pub enum FetchError {
    Http(reqwest::Error),
    Status { code: u16, body: String },
    Decode(serde_json::Error),
    Shape(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "request to the table store failed: {err}"),
            Self::Status { code, body } => {
                write!(f, "table store answered HTTP {code}: {body}")
            }
            Self::Decode(err) => write!(f, "table store payload was not valid JSON: {err}"),
            Self::Shape(detail) => write!(f, "unexpected table store payload: {detail}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Fetches every row of the configured table. The transport's own timeout
/// is the only one enforced.
pub fn fetch_rows(config: &SourceConfig) -> Result<Vec<Value>, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .build()
        .map_err(FetchError::Http)?;
    let response = client
        .get(config.rows_url())
        .header("apikey", &config.api_key)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .header("Accept", "application/json")
        .send()
        .map_err(FetchError::Http)?;

    let status = response.status();
    let body = response.text().map_err(FetchError::Http)?;
    if !status.is_success() {
        let excerpt: String = body.chars().take(300).collect();
        return Err(FetchError::Status {
            code: status.as_u16(),
            body: excerpt,
        });
    }

    let payload: Value = serde_json::from_str(&body).map_err(FetchError::Decode)?;
    match payload {
        Value::Array(rows) => Ok(rows),
        other => Err(FetchError::Shape(format!(
            "expected a JSON array of rows, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
