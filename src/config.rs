//! Transport configuration and discovery
//!
//! [`TransportConfig`] is the typed form of the host's transport mapping.
//! [`discover_transport`] locates that mapping the way the host does: the
//! Airflow transport env var, `OPENLINEAGE_CONFIG`, then `openlineage.yml`
//! in the working directory and in `~/.openlineage/`.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::wire::strip_nulls;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Env var holding a JSON transport object (`{"type": "correlator", "url": ...}`)
pub const AIRFLOW_TRANSPORT_ENV: &str = "AIRFLOW__OPENLINEAGE__TRANSPORT";
/// Env var holding either an inline JSON document or a path to a YAML file
pub const OPENLINEAGE_CONFIG_ENV: &str = "OPENLINEAGE_CONFIG";
pub const CONFIG_FILE_NAME: &str = "openlineage.yml";

/// Correlator transport settings
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Correlator base URL; empty disables emission
    pub url: String,
    /// Sent as `X-API-Key` when set
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout: u64,
    pub verify_ssl: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            verify_ssl: true,
        }
    }
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

impl TransportConfig {
    /// Build from the host's transport mapping.
    ///
    /// Missing or null keys take their defaults and unknown keys (such as
    /// `type`) are ignored. Only a value of the wrong JSON type is an error.
    pub fn from_mapping(params: &Map<String, Value>) -> Result<Self, ConfigError> {
        serde_json::from_value(strip_nulls(Value::Object(params.clone()))).map_err(ConfigError::InvalidValue)
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn is_enabled(&self) -> bool {
        !self.url.is_empty()
    }

    /// Copy safe for display, with the API key replaced
    pub fn masked(&self) -> Self {
        Self {
            api_key: self.api_key.as_ref().map(|_| "***".to_string()),
            ..self.clone()
        }
    }
}

/// A transport entry found by discovery
#[derive(Debug, Clone, PartialEq)]
pub struct TransportSection {
    /// Value of the `type` key
    pub kind: String,
    /// Remaining keys
    pub params: Map<String, Value>,
    /// Where the section came from, for logging
    pub origin: String,
}

impl TransportSection {
    fn from_value(value: Value, origin: &str) -> Result<Self> {
        let Value::Object(mut params) = value else {
            eyre::bail!("transport in {} is not an object", origin);
        };
        let kind = match params.remove("type") {
            Some(Value::String(kind)) => kind,
            Some(other) => eyre::bail!("transport type in {} is not a string: {}", origin, other),
            None => eyre::bail!("transport in {} has no type", origin),
        };
        Ok(Self {
            kind,
            params,
            origin: origin.to_string(),
        })
    }
}

/// Inputs consulted by discovery
#[derive(Debug, Clone, Default)]
pub struct DiscoverySources {
    pub env: HashMap<String, String>,
    pub working_dir: PathBuf,
    pub home_dir: Option<PathBuf>,
}

impl DiscoverySources {
    /// Snapshot of the current process environment
    pub fn from_process() -> Self {
        Self {
            env: utf8_vars(std::env::vars_os()),
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            home_dir: dirs::home_dir(),
        }
    }

    fn var(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str).filter(|v| !v.trim().is_empty())
    }
}

/// Keep the variables whose name and value are both valid UTF-8
fn utf8_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Discover the transport section from the process environment
pub fn discover_transport() -> Option<TransportSection> {
    discover_transport_with(&DiscoverySources::from_process())
}

/// Discover the transport section with a fallback chain.
///
/// A source that exists but cannot be parsed is logged and skipped.
pub fn discover_transport_with(sources: &DiscoverySources) -> Option<TransportSection> {
    if let Some(raw) = sources.var(AIRFLOW_TRANSPORT_ENV) {
        match parse_json(raw, AIRFLOW_TRANSPORT_ENV)
            .and_then(|value| TransportSection::from_value(value, AIRFLOW_TRANSPORT_ENV))
        {
            Ok(section) => return Some(section),
            Err(e) => log::warn!("Ignoring {}: {:#}", AIRFLOW_TRANSPORT_ENV, e),
        }
    }

    if let Some(raw) = sources.var(OPENLINEAGE_CONFIG_ENV) {
        let loaded = if raw.trim_start().starts_with('{') {
            parse_json(raw, OPENLINEAGE_CONFIG_ENV).and_then(|doc| transport_from_document(doc, OPENLINEAGE_CONFIG_ENV))
        } else {
            load_from_file(Path::new(raw), sources)
        };
        match loaded {
            Ok(Some(section)) => return Some(section),
            Ok(None) => log::debug!("{} has no transport section", OPENLINEAGE_CONFIG_ENV),
            Err(e) => log::warn!("Ignoring {}: {:#}", OPENLINEAGE_CONFIG_ENV, e),
        }
    }

    let mut candidates = vec![sources.working_dir.join(CONFIG_FILE_NAME)];
    if let Some(home) = &sources.home_dir {
        candidates.push(home.join(".openlineage").join(CONFIG_FILE_NAME));
    }

    for path in candidates {
        if !path.exists() {
            continue;
        }
        match load_from_file(&path, sources) {
            Ok(Some(section)) => return Some(section),
            Ok(None) => log::debug!("{} has no transport section", path.display()),
            Err(e) => log::warn!("Failed to load config from {}: {:#}", path.display(), e),
        }
    }

    log::info!("No OpenLineage transport configured");
    None
}

fn parse_json(raw: &str, origin: &str) -> Result<Value> {
    serde_json::from_str(raw).context(format!("{} is not valid JSON", origin))
}

fn transport_from_document(doc: Value, origin: &str) -> Result<Option<TransportSection>> {
    match doc {
        Value::Object(mut map) => match map.remove("transport") {
            Some(Value::Null) | None => Ok(None),
            Some(transport) => TransportSection::from_value(transport, origin).map(Some),
        },
        Value::Null => Ok(None),
        _ => eyre::bail!("{} is not a mapping", origin),
    }
}

fn load_from_file(path: &Path, sources: &DiscoverySources) -> Result<Option<TransportSection>> {
    let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    let doc: Value = serde_yaml::from_str(&content).context(format!("Failed to parse {}", path.display()))?;
    let doc = expand_env(doc, &sources.env);

    let section = transport_from_document(doc, &path.display().to_string())?;
    if section.is_some() {
        log::info!("Loaded transport config from: {}", path.display());
    }
    Ok(section)
}

/// Expand `${VAR}` and `$VAR` in string values; unset variables are left as written
fn expand_env(value: Value, env: &HashMap<String, String>) -> Value {
    match value {
        Value::String(s) => {
            let expanded = shellexpand::env_with_context_no_errors(&s, |name| env.get(name));
            Value::String(expanded.into_owned())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(|v| expand_env(v, env)).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, expand_env(v, env))).collect()),
        other => other,
    }
}
